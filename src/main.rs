use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use flag_engine::config::Config;
use flag_engine::sdk::{
    ErrorResponse, EvaluateRequest, EvaluateResponse, SdkEvaluationService, SnapshotStore,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .with_writer(io::stderr)
        .init();

    let store = match SnapshotStore::from_path(&config.snapshot_path) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "could not load flag snapshot");
            return ExitCode::FAILURE;
        }
    };

    let service = SdkEvaluationService::new(store);

    info!(
        path = %config.snapshot_path.display(),
        flags = service.source().snapshot().flags.len(),
        "flag snapshot loaded, reading requests from stdin"
    );

    match serve(&service, io::stdin().lock(), io::stdout().lock()) {
        Ok(count) => {
            info!(requests = count, "stdin closed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "i/o failure");
            ExitCode::FAILURE
        }
    }
}

/// Answers one JSON request per input line and returns how many lines were handled.
fn serve(
    service: &SdkEvaluationService<SnapshotStore>,
    input: impl BufRead,
    mut output: impl Write,
) -> io::Result<usize> {
    let mut count = 0;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        count += 1;

        let response = match handle(service, &line) {
            Ok(body) => body,
            Err(message) => {
                warn!(error = %message, "request failed");
                serde_json::to_string(&ErrorResponse { error: message })?
            }
        };

        writeln!(output, "{}", response)?;
    }

    output.flush()?;
    Ok(count)
}

fn handle(service: &SdkEvaluationService<SnapshotStore>, line: &str) -> Result<String, String> {
    let request: EvaluateRequest =
        serde_json::from_str(line).map_err(|e| format!("invalid request: {}", e))?;

    let body = match &request.flag_key {
        Some(flag_key) => {
            let result = service
                .evaluate_flag(&request.project, &request.environment, flag_key, &request.context)
                .map_err(|e| e.to_string())?;
            serde_json::to_string(&result)
        }
        None => {
            let flags = service
                .evaluate_all_flags(&request.project, &request.environment, &request.context)
                .map_err(|e| e.to_string())?;
            serde_json::to_string(&EvaluateResponse { flags })
        }
    };

    body.map_err(|e| format!("could not encode response: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flag_engine::sdk::Snapshot;
    use flag_engine::environments::{Environment, EnvironmentKey};
    use flag_engine::projects::{Project, ProjectKey};
    use flag_engine::{Flag, FlagEnvironmentConfig, FlagKey, FlagType, FlagValue};
    use serde_json::{json, Value};

    fn create_test_service() -> SdkEvaluationService<SnapshotStore> {
        let project = Project::new(ProjectKey::parse("storefront").unwrap(), "Storefront");
        let env = Environment::new(project.id, EnvironmentKey::parse("production").unwrap(), "Production");
        let flag = Flag::new(project.id, FlagKey::parse("new-checkout").unwrap(), "New checkout", FlagType::Boolean);
        let config = FlagEnvironmentConfig::new(flag.id, env.id, true, FlagValue::Boolean(true));

        SdkEvaluationService::new(SnapshotStore::new(Snapshot {
            projects: vec![project],
            environments: vec![env],
            flags: vec![flag],
            configs: vec![config],
        }))
    }

    fn run(input: &str) -> Vec<Value> {
        let service = create_test_service();
        let mut output = Vec::new();
        serve(&service, input.as_bytes(), &mut output).unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_single_flag_request() {
        let responses = run(
            r#"{"project":"storefront","environment":"production","flagKey":"new-checkout"}"#,
        );

        assert_eq!(
            responses,
            vec![json!({ "flagKey": "new-checkout", "value": true, "reason": "DEFAULT" })]
        );
    }

    #[test]
    fn test_all_flags_request() {
        let responses = run(r#"{"project":"storefront","environment":"production","context":{"userId":"u1"}}"#);

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["flags"].as_array().unwrap().len(), 1);
        assert_eq!(responses[0]["flags"][0]["flagKey"], json!("new-checkout"));
    }

    #[test]
    fn test_errors_do_not_stop_processing() {
        let input = concat!(
            "not json\n",
            "\n",
            r#"{"project":"storefront","environment":"qa"}"#,
            "\n",
            r#"{"project":"storefront","environment":"production","flagKey":"missing-flag"}"#,
            "\n",
        );
        let responses = run(input);

        assert_eq!(responses.len(), 3);
        assert!(responses[0]["error"].as_str().unwrap().starts_with("invalid request"));
        assert_eq!(responses[1], json!({ "error": "Environment 'qa' not found" }));
        assert_eq!(responses[2]["reason"], json!("FLAG_NOT_FOUND"));
        assert_eq!(responses[2]["value"], json!(false));
    }
}
