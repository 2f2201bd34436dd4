//! AWS Lambda handler for the installment calculator
//!
//! Accepts a calculation input as JSON and returns the headline present value along with
//! the chart series and its summary.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use aws_lambda_events::event::lambda_function_urls::{LambdaFunctionUrlRequest, LambdaFunctionUrlResponse};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http::header::{HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use http::HeaderMap;
use installment_reserve::{
    instrument::MAX_INSTALLMENTS,
    reserve::{CalculationInput, ReserveQuote},
    trajectory::{generate_trajectory, ChartPoint, TrajectoryInput, TrajectorySummary},
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::Serialize;

/// Output of one calculation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    pub installment_amount: f64,
    pub present_value: f64,
    pub savings: f64,
    pub trajectory: Vec<ChartPoint>,
    pub summary: TrajectorySummary,
    pub execution_time_ms: u64,
}

fn cors_headers() -> HeaderMap {
    let entries: [(HeaderName, &'static str); 3] = [
        (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
        (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
    ];

    let mut headers = HeaderMap::new();
    for (name, value) in entries {
        headers.insert(name, HeaderValue::from_static(value));
    }
    headers
}

fn response(status_code: i64, body: Option<String>) -> LambdaFunctionUrlResponse {
    let mut headers = cors_headers();
    if body.is_some() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    LambdaFunctionUrlResponse {
        status_code,
        headers,
        body,
        is_base64_encoded: false,
        cookies: Vec::new(),
    }
}

fn error_response(status_code: i64, message: &str) -> LambdaFunctionUrlResponse {
    let body = serde_json::json!({ "error": message }).to_string();
    response(status_code, Some(body))
}

/// Decode the request body, which may arrive base64-encoded through the function URL
fn request_body(event: &LambdaFunctionUrlRequest) -> Result<String, String> {
    let raw = event.body.clone().unwrap_or_else(|| "{}".to_string());
    if !event.is_base64_encoded {
        return Ok(raw);
    }
    let bytes = STANDARD
        .decode(raw.trim())
        .map_err(|e| format!("Invalid base64 body: {}", e))?;
    String::from_utf8(bytes).map_err(|e| format!("Invalid UTF-8 body: {}", e))
}

/// Lambda handler function
async fn handler(event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<LambdaFunctionUrlResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;

    // Handle CORS preflight
    if request.request_context.http.method.as_deref() == Some("OPTIONS") {
        return Ok(response(200, None));
    }

    let body = match request_body(&request) {
        Ok(body) => body,
        Err(message) => return Ok(error_response(400, &message)),
    };

    let input: CalculationInput = match serde_json::from_str(&body) {
        Ok(input) => input,
        Err(e) => {
            return Ok(error_response(400, &format!("Invalid JSON: {}", e)));
        }
    };

    if input.installment_count > MAX_INSTALLMENTS {
        return Ok(error_response(
            400,
            &format!("installmentCount must be at most {}", MAX_INSTALLMENTS),
        ));
    }

    let quote = ReserveQuote::from_input(&input);
    let trajectory = generate_trajectory(&TrajectoryInput::from(&input));
    let summary = TrajectorySummary::from_points(&trajectory);

    log::info!(
        "calculated pv={:.2} for {} installments in {:?}",
        quote.present_value,
        input.installment_count,
        start.elapsed()
    );

    let output = CalculationResponse {
        installment_amount: quote.installment_amount,
        present_value: quote.present_value,
        savings: quote.savings,
        trajectory,
        summary,
        execution_time_ms: start.elapsed().as_millis() as u64,
    };

    Ok(response(200, Some(serde_json::to_string(&output)?)))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
