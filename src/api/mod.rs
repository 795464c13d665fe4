use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    Child, DEFAULT_TERMINAL_AGE, Economics, EducationCostTable, EducationPattern,
    HouseholdConfig, HousingDuration, HousingPlan, OneTimeEvent, ProjectionSummary, YearRecord,
    run, summarize,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliEconomicsMode {
    Breakdown,
    FlatSavings,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiEconomicsMode {
    #[serde(alias = "income-breakdown")]
    Breakdown,
    #[serde(alias = "flatSavings", alias = "flat_savings", alias = "flat")]
    FlatSavings,
}

impl From<ApiEconomicsMode> for CliEconomicsMode {
    fn from(value: ApiEconomicsMode) -> Self {
        match value {
            ApiEconomicsMode::Breakdown => CliEconomicsMode::Breakdown,
            ApiEconomicsMode::FlatSavings => CliEconomicsMode::FlatSavings,
        }
    }
}

/// List fields arrive as a JSON array on POST and as a comma-separated spec
/// string on GET, e.g. `housingPlans=8:9,15:indefinite`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListField<T> {
    List(Vec<T>),
    Spec(String),
}

/// Fields with no flat text form. A query string can only carry them as text,
/// which is rejected.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BodyOnlyField<T> {
    Value(T),
    Text(String),
}

impl<T> BodyOnlyField<T> {
    fn into_value(self, name: &str) -> Result<T, String> {
        match self {
            BodyOnlyField::Value(value) => Ok(value),
            BodyOnlyField::Text(_) => Err(format!(
                "{name} must be a JSON object and can only be sent in a POST body"
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    current_age: Option<u32>,
    current_assets: Option<f64>,
    interest_rate_pct: Option<f64>,

    mode: Option<ApiEconomicsMode>,
    monthly_income: Option<f64>,
    monthly_living_cost: Option<f64>,
    housing_plans: Option<ListField<HousingPlan>>,
    monthly_savings: Option<f64>,
    housing_remaining_years: Option<u32>,
    rent_increase: Option<f64>,

    /// Leading child; `educationPattern` applies to this child only.
    child_birth_years_from_now: Option<i32>,
    education_pattern: Option<String>,
    /// Replaces the default child. A `childBirthYearsFromNow` sent alongside
    /// is kept as the first child.
    children: Option<ListField<Child>>,
    childcare_reduction: Option<f64>,
    /// POST only.
    education_costs: Option<BodyOnlyField<EducationCostTable>>,
    one_time_events: Option<ListField<OneTimeEvent>>,

    retirement_age: Option<u32>,
    retirement_bonus: Option<f64>,
    #[serde(alias = "deathAge")]
    terminal_age: Option<u32>,

    target_amount: Option<f64>,
    reference_age: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(
    name = "household-projection",
    about = "Year-by-year household net-worth projection (housing phases, children, one-time events, retirement bonus)"
)]
struct Cli {
    #[arg(long)]
    current_age: u32,
    #[arg(long, allow_hyphen_values = true)]
    current_assets: f64,
    #[arg(long, default_value_t = 5.0, help = "Annual growth rate in percent")]
    interest_rate: f64,
    #[arg(long, value_enum, default_value_t = CliEconomicsMode::Breakdown)]
    mode: CliEconomicsMode,
    #[arg(long, default_value_t = 0.0)]
    monthly_income: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly_living_cost: f64,
    #[arg(
        long = "housing-plan",
        value_parser = parse_housing_plan,
        help = "Housing phase as COST:YEARS or COST:indefinite; repeat in order"
    )]
    housing_plans: Vec<HousingPlan>,
    #[arg(long, default_value_t = 0.0, help = "Flat-savings mode only")]
    monthly_savings: f64,
    #[arg(long, default_value_t = 0, help = "Flat-savings mode only")]
    housing_remaining_years: u32,
    #[arg(long, default_value_t = 0.0, help = "Flat-savings mode only")]
    rent_increase: f64,
    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Years until the first child is born; negative if already born"
    )]
    child_birth_years_from_now: Option<i32>,
    #[arg(long, default_value = "all-public", help = "Education pattern of the first child")]
    education_pattern: String,
    #[arg(
        long = "child",
        allow_hyphen_values = true,
        value_parser = parse_child,
        help = "Further child as OFFSET[:PATTERN]; repeat per child"
    )]
    children: Vec<Child>,
    #[arg(long, default_value_t = 0.0, help = "Monthly childcare cost per child aged 0-22")]
    childcare_reduction: f64,
    #[arg(
        long = "event",
        value_parser = parse_one_time_event,
        help = "One-time event as AGE:AMOUNT:income|expense[:NAME]; repeat per event"
    )]
    one_time_events: Vec<OneTimeEvent>,
    #[arg(long)]
    retirement_age: u32,
    #[arg(long, default_value_t = 0.0)]
    retirement_bonus: f64,
    #[arg(long, default_value_t = DEFAULT_TERMINAL_AGE)]
    terminal_age: u32,
    #[arg(long, default_value_t = 5000.0)]
    target_amount: f64,
    #[arg(long, help = "Age to report the balance at; defaults to the retirement age")]
    reference_age: Option<u32>,
}

#[derive(Copy, Clone, Debug)]
struct ApiOptions {
    target_amount: f64,
    reference_age: u32,
}

#[derive(Debug)]
struct ApiRequest {
    config: HouseholdConfig,
    options: ApiOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    mode: &'static str,
    children: Vec<Child>,
    target_amount: f64,
    summary: Option<ProjectionSummary>,
    years: Vec<YearRecord>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn parse_housing_plan(raw: &str) -> Result<HousingPlan, String> {
    let (cost, duration) = raw
        .split_once(':')
        .ok_or_else(|| format!("housing plan {raw:?} must look like COST:YEARS"))?;
    let monthly_cost = cost
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid housing cost {cost:?}"))?;
    let duration = duration.parse::<HousingDuration>()?;
    Ok(HousingPlan {
        monthly_cost,
        duration,
    })
}

fn parse_child(raw: &str) -> Result<Child, String> {
    raw.parse()
}

fn parse_one_time_event(raw: &str) -> Result<OneTimeEvent, String> {
    raw.parse()
}

fn parse_list<T>(spec: &str, parse: fn(&str) -> Result<T, String>) -> Result<Vec<T>, String> {
    spec.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse)
        .collect()
}

fn list_field<T>(
    field: ListField<T>,
    parse: fn(&str) -> Result<T, String>,
) -> Result<Vec<T>, String> {
    match field {
        ListField::List(items) => Ok(items),
        ListField::Spec(spec) => parse_list(&spec, parse),
    }
}

fn build_config(cli: Cli) -> Result<HouseholdConfig, String> {
    if !cli.interest_rate.is_finite() || cli.interest_rate <= -100.0 {
        return Err("--interest-rate must be > -100".to_string());
    }

    let economics = match cli.mode {
        CliEconomicsMode::Breakdown => Economics::Breakdown {
            monthly_income: cli.monthly_income,
            monthly_living_cost: cli.monthly_living_cost,
            housing_plans: cli.housing_plans,
        },
        CliEconomicsMode::FlatSavings => Economics::FlatSavings {
            monthly_savings: cli.monthly_savings,
            housing_remaining_years: cli.housing_remaining_years,
            rent_increase: cli.rent_increase,
        },
    };

    let mut children = Vec::with_capacity(cli.children.len() + 1);
    if let Some(offset) = cli.child_birth_years_from_now {
        children.push(Child::new(
            offset,
            EducationPattern::from_label(&cli.education_pattern),
        ));
    }
    children.extend(cli.children);

    Ok(HouseholdConfig {
        current_age: cli.current_age,
        current_assets: cli.current_assets,
        annual_interest_rate: cli.interest_rate / 100.0,
        economics,
        children,
        childcare_monthly_reduction: cli.childcare_reduction,
        education_costs: EducationCostTable::default(),
        one_time_events: cli.one_time_events,
        retirement_age: cli.retirement_age,
        retirement_bonus: cli.retirement_bonus,
        terminal_age: cli.terminal_age,
    })
}

fn api_options(cli: &Cli) -> Result<ApiOptions, String> {
    if !cli.target_amount.is_finite() {
        return Err("--target-amount must be a finite number".to_string());
    }
    Ok(ApiOptions {
        target_amount: cli.target_amount,
        reference_age: cli.reference_age.unwrap_or(cli.retirement_age),
    })
}

/// Runs the command-line projection and returns the JSON report.
pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    let options = api_options(&cli)?;
    let request = ApiRequest {
        config: build_config(cli)?,
        options,
    };
    let response = simulate(&request)?;
    serde_json::to_string_pretty(&response).map_err(|e| format!("failed to encode report: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("Household projection API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            log::warn!("rejected simulate request: {msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match simulate(&request) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => {
            log::warn!("rejected simulate request: {msg}");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn simulate(request: &ApiRequest) -> Result<SimulateResponse, String> {
    let years = run(&request.config).map_err(|e| e.to_string())?;
    let summary = summarize(
        &years,
        request.options.target_amount,
        request.options.reference_age,
    );
    Ok(build_simulate_response(&request.config, request.options, summary, years))
}

fn with_no_store(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_no_store((status, Json(body)).into_response())
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.current_assets {
        cli.current_assets = v;
    }
    if let Some(v) = payload.interest_rate_pct {
        cli.interest_rate = v;
    }

    if let Some(v) = payload.mode {
        cli.mode = v.into();
    }
    if let Some(v) = payload.monthly_income {
        cli.monthly_income = v;
    }
    if let Some(v) = payload.monthly_living_cost {
        cli.monthly_living_cost = v;
    }
    if let Some(v) = payload.housing_plans {
        cli.housing_plans = list_field(v, parse_housing_plan)?;
    }
    if let Some(v) = payload.monthly_savings {
        cli.monthly_savings = v;
    }
    if let Some(v) = payload.housing_remaining_years {
        cli.housing_remaining_years = v;
    }
    if let Some(v) = payload.rent_increase {
        cli.rent_increase = v;
    }

    if let Some(v) = payload.children {
        cli.children = list_field(v, parse_child)?;
        cli.child_birth_years_from_now = None;
    }
    if let Some(v) = payload.child_birth_years_from_now {
        cli.child_birth_years_from_now = Some(v);
    }
    if let Some(v) = payload.education_pattern {
        cli.education_pattern = v;
    }
    if let Some(v) = payload.childcare_reduction {
        cli.childcare_reduction = v;
    }
    if let Some(v) = payload.one_time_events {
        cli.one_time_events = list_field(v, parse_one_time_event)?;
    }

    if let Some(v) = payload.retirement_age {
        cli.retirement_age = v;
    }
    if let Some(v) = payload.retirement_bonus {
        cli.retirement_bonus = v;
    }
    if let Some(v) = payload.terminal_age {
        cli.terminal_age = v;
    }

    if let Some(v) = payload.target_amount {
        cli.target_amount = v;
    }
    if let Some(v) = payload.reference_age {
        cli.reference_age = Some(v);
    }

    let education_costs = payload
        .education_costs
        .map(|field| field.into_value("educationCosts"))
        .transpose()?;

    let options = api_options(&cli)?;
    let mut config = build_config(cli)?;
    if let Some(table) = education_costs {
        config.education_costs = table;
    }

    Ok(ApiRequest { config, options })
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_age: 32,
        current_assets: 700.0,
        interest_rate: 5.0,
        mode: CliEconomicsMode::Breakdown,
        monthly_income: 60.0,
        monthly_living_cost: 30.0,
        housing_plans: vec![HousingPlan::years(8.0, 9), HousingPlan::indefinite(15.0)],
        monthly_savings: 30.0,
        housing_remaining_years: 9,
        rent_increase: 7.0,
        child_birth_years_from_now: Some(2),
        education_pattern: "all-public".to_string(),
        children: Vec::new(),
        childcare_reduction: 5.0,
        one_time_events: Vec::new(),
        retirement_age: 55,
        retirement_bonus: 1500.0,
        terminal_age: DEFAULT_TERMINAL_AGE,
        target_amount: 5000.0,
        reference_age: None,
    }
}

fn build_simulate_response(
    config: &HouseholdConfig,
    options: ApiOptions,
    summary: Option<ProjectionSummary>,
    years: Vec<YearRecord>,
) -> SimulateResponse {
    SimulateResponse {
        mode: config.economics.mode_name(),
        children: config.children.clone(),
        target_amount: options.target_amount,
        summary,
        years,
    }
}
