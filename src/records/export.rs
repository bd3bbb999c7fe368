//! Bulk export of weather records as JSON, CSV, Markdown or XML

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::models::WeatherRecord;
use crate::{Result, WeatherError};

const CSV_HEADERS: [&str; 11] = [
    "id",
    "location_query",
    "location_name",
    "latitude",
    "longitude",
    "start_date",
    "end_date",
    "overall_min_c",
    "overall_max_c",
    "created_at",
    "updated_at",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
    Xml,
}

impl FromStr for ExportFormat {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "xml" => Ok(ExportFormat::Xml),
            _ => Err(WeatherError::invalid_input(
                "Unsupported export format. Use json, csv, md, or xml.",
            )),
        }
    }
}

impl ExportFormat {
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Xml => "application/xml; charset=utf-8",
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "md",
            ExportFormat::Xml => "xml",
        }
    }

    #[must_use]
    pub fn content_disposition(self) -> String {
        format!("attachment; filename=weather-records.{}", self.extension())
    }

    pub fn render(self, records: &[WeatherRecord]) -> Result<String> {
        match self {
            ExportFormat::Json => serde_json::to_string(records)
                .map_err(|e| WeatherError::storage(format!("Failed to encode records as JSON: {e}"))),
            ExportFormat::Csv => Ok(to_csv(records)),
            ExportFormat::Markdown => Ok(to_markdown(records)),
            ExportFormat::Xml => to_xml(records),
        }
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn escape_csv(text: &str) -> String {
    if text.contains(['"', ',', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

#[must_use]
pub fn to_csv(records: &[WeatherRecord]) -> String {
    let mut lines = vec![CSV_HEADERS.join(",")];
    for record in records {
        let values = [
            record.id.to_string(),
            record.location_query.clone(),
            record.location_name.clone(),
            record.latitude.to_string(),
            record.longitude.to_string(),
            record.start_date.clone(),
            record.end_date.clone(),
            optional(record.temperature_payload.overall_min_c),
            optional(record.temperature_payload.overall_max_c),
            timestamp(&record.created_at),
            timestamp(&record.updated_at),
        ];
        lines.push(values.iter().map(|v| escape_csv(v)).collect::<Vec<_>>().join(","));
    }
    lines.join("\n")
}

#[must_use]
pub fn to_markdown(records: &[WeatherRecord]) -> String {
    let mut lines = vec![
        "| id | location | range | min C | max C | created |".to_string(),
        "| --- | --- | --- | --- | --- | --- |".to_string(),
    ];
    for record in records {
        lines.push(format!(
            "| {} | {} | {} to {} | {} | {} | {} |",
            record.id,
            record.location_name.replace('|', "\\|"),
            record.start_date,
            record.end_date,
            optional(record.temperature_payload.overall_min_c),
            optional(record.temperature_payload.overall_max_c),
            timestamp(&record.created_at),
        ));
    }
    lines.join("\n")
}

#[derive(Serialize)]
#[serde(rename = "records")]
struct XmlRecords<'a> {
    record: Vec<XmlRecord<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct XmlRecord<'a> {
    id: u64,
    location_query: &'a str,
    location_name: &'a str,
    latitude: f64,
    longitude: f64,
    start_date: &'a str,
    end_date: &'a str,
    overall_min_c: String,
    overall_max_c: String,
    created_at: String,
    updated_at: String,
}

impl<'a> From<&'a WeatherRecord> for XmlRecord<'a> {
    fn from(record: &'a WeatherRecord) -> Self {
        Self {
            id: record.id,
            location_query: &record.location_query,
            location_name: &record.location_name,
            latitude: record.latitude,
            longitude: record.longitude,
            start_date: &record.start_date,
            end_date: &record.end_date,
            overall_min_c: optional(record.temperature_payload.overall_min_c),
            overall_max_c: optional(record.temperature_payload.overall_max_c),
            created_at: timestamp(&record.created_at),
            updated_at: timestamp(&record.updated_at),
        }
    }
}

pub fn to_xml(records: &[WeatherRecord]) -> Result<String> {
    let document = XmlRecords {
        record: records.iter().map(XmlRecord::from).collect(),
    };
    quick_xml::se::to_string(&document)
        .map_err(|e| WeatherError::storage(format!("Failed to encode records as XML: {e}")))
}
