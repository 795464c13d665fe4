use std::env;

#[tokio::main]
async fn main() {
    env_logger::init();

    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            if let Err(e) = household_projection::api::run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Some("project") => {
            let args = std::iter::once(raw_args[0].clone()).chain(raw_args[2..].iter().cloned());
            match household_projection::api::run_cli(args) {
                Ok(report) => println!("{report}"),
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(2);
                }
            }
        }
        _ => {
            eprintln!("Usage: household-projection serve [port]");
            eprintln!("       household-projection project --current-age N --current-assets N --retirement-age N [options]");
            std::process::exit(1);
        }
    }
}
