//! Report options for a device: available models plus analysis output

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::CatalogConfig;
use crate::errors::{AppError, Result};
use crate::storage::{basename, StorageBackend};

const MODEL_EXTENSIONS: [&str; 4] = [".pt", ".onnx", ".h5", ".engine"];
const LOGS_OPTION: &str = "Logs";
const ANALYSIS_OPTION: &str = "Analysis Data";

/// Query parameters for the model options endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ModelQuery {
    pub device_name: Option<String>,
    #[serde(rename = "ClientNumber")]
    pub client_number: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
}

/// Options offered to the report form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelOptions {
    pub options: Vec<String>,
    /// Whether the analysis CSV exists, and the key it was looked up under
    pub csv: (bool, String),
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::MissingParameter(name)),
    }
}

/// Key of the disposal CSV produced for a device and date
fn analysis_key(output_prefix: &str, device_name: &str, client_number: &str, date: &str) -> String {
    let os_number = device_name.rsplit('_').next().unwrap_or(device_name);
    format!(
        "{output_prefix}client-{client_number}/client-{client_number}_device-os{os_number}_date-{date}_disposal.csv"
    )
}

/// Available models plus `Analysis Data` when the device's CSV exists
#[instrument(skip(storage, config))]
pub async fn model_options(
    storage: &dyn StorageBackend,
    config: &CatalogConfig,
    query: &ModelQuery,
) -> Result<ModelOptions> {
    let device_name = required(&query.device_name, "device_name")?;
    let date = required(&query.date, "Date")?;
    let client_number = required(&query.client_number, "ClientNumber")?;

    let csv_key = analysis_key(&config.output_prefix, device_name, client_number, date);
    let csv_exists = match storage.head(&config.output_bucket, &csv_key).await {
        Ok(_) => true,
        Err(object_store::Error::NotFound { .. }) => false,
        Err(e) => return Err(e.into()),
    };
    debug!(csv_key = %csv_key, csv_exists, "Checked analysis output");

    let models = storage
        .list(&config.models_bucket, &config.models_prefix)
        .await?;

    let mut options = vec![LOGS_OPTION.to_string()];
    options.extend(
        models
            .iter()
            .filter(|meta| {
                let key: &str = meta.location.as_ref();
                MODEL_EXTENSIONS.iter().any(|ext| key.ends_with(ext))
            })
            .map(|meta| basename(&meta.location).to_string()),
    );
    if csv_exists {
        options.push(ANALYSIS_OPTION.to_string());
    }

    Ok(ModelOptions {
        options,
        csv: (csv_exists, csv_key),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::FakeStore;

    fn query(device: &str, client: &str, date: &str) -> ModelQuery {
        ModelQuery {
            device_name: Some(device.to_string()),
            client_number: Some(client.to_string()),
            date: Some(date.to_string()),
        }
    }

    fn models_store() -> FakeStore {
        FakeStore::new()
            .with_object("graph-pilot", "models/yolo_v8.pt", 10)
            .with_object("graph-pilot", "models/nested/detector.onnx", 10)
            .with_object("graph-pilot", "models/README.md", 1)
    }

    #[test]
    fn analysis_key_uses_last_device_segment() {
        assert_eq!(
            analysis_key("output/", "acme_site_7", "12", "2024-03-09"),
            "output/client-12/client-12_device-os7_date-2024-03-09_disposal.csv"
        );
    }

    #[tokio::test]
    async fn lists_models_without_analysis() {
        let storage = models_store();
        let result = model_options(&storage, &CatalogConfig::default(), &query("acme_7", "12", "2024-03-09"))
            .await
            .unwrap();

        assert_eq!(result.options, vec!["Logs", "detector.onnx", "yolo_v8.pt"]);
        assert!(!result.csv.0);
        assert_eq!(
            result.csv.1,
            "output/client-12/client-12_device-os7_date-2024-03-09_disposal.csv"
        );
    }

    #[tokio::test]
    async fn offers_analysis_when_csv_exists() {
        let storage = models_store().with_object(
            "vendor-analysis-webapp-production",
            "output/client-12/client-12_device-os7_date-2024-03-09_disposal.csv",
            42,
        );
        let result = model_options(&storage, &CatalogConfig::default(), &query("acme_7", "12", "2024-03-09"))
            .await
            .unwrap();

        assert_eq!(result.options.last().map(String::as_str), Some("Analysis Data"));
        assert!(result.csv.0);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["csv"][0], true);
    }

    #[tokio::test]
    async fn missing_parameters_are_rejected_before_storage() {
        let storage = models_store();
        let mut q = query("acme_7", "12", "2024-03-09");
        q.date = None;

        let result = model_options(&storage, &CatalogConfig::default(), &q).await;
        assert!(matches!(result, Err(AppError::MissingParameter("Date"))));

        let result = model_options(&storage, &CatalogConfig::default(), &ModelQuery::default()).await;
        assert!(matches!(result, Err(AppError::MissingParameter("device_name"))));
        assert_eq!(storage.call_count(), 0);
    }

    #[tokio::test]
    async fn head_failures_other_than_not_found_propagate() {
        let storage = models_store().with_unreachable("vendor-analysis-webapp-production");
        let result = model_options(&storage, &CatalogConfig::default(), &query("acme_7", "12", "2024-03-09")).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
    }
}
