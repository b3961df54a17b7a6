//! Presentation-shell protocol
//!
//! Requests carry form fields as the user entered them; responses carry either
//! the operation's result or an error report. Every error is recovered at the
//! operation boundary so a bad request never leaves the store half-changed.

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;
use crate::input::{MeasurementForm, ReadingForm, RowSelection};
use crate::pipeline::SensorMonitor;
use crate::types::{
    AddOutcome, ReadingKey, SensorReading, SensorSeries, Status, StatusCounts, StoreSummary,
};

/// An operation requested by the presentation shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Score, label and store a reading
    Add(ReadingForm),
    /// Store a reading labeled by the classifier
    AddPredicted(ReadingForm),
    /// Classifier prediction, no store change
    Predict(MeasurementForm),
    /// Formula score and threshold label, no store change
    Score(MeasurementForm),
    /// Delete the selected rows
    Delete {
        #[serde(default)]
        selection: Vec<RowSelection>,
    },
    /// Readings of one sensor, or all for an empty id
    Filter {
        #[serde(default)]
        sensor_id: String,
    },
    Summary,
    StatusCounts,
    StressSeries,
    Export,
}

/// Result of a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Response {
    Added(AddOutcome),
    AddedPredicted { status: Status },
    Prediction { predicted_status: Status },
    Score { health_score: f64, status: Status },
    Deleted { removed: usize },
    Readings { readings: Vec<SensorReading> },
    Summary(StoreSummary),
    StatusCounts(StatusCounts),
    StressSeries { series: Vec<SensorSeries> },
    Error { code: String, message: String },
}

impl From<MonitorError> for Response {
    fn from(e: MonitorError) -> Self {
        Response::Error {
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}

impl SensorMonitor {
    /// Execute one request
    pub fn handle(&mut self, request: Request) -> Response {
        match self.try_handle(request) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(code = e.code(), error = %e, "request rejected");
                e.into()
            }
        }
    }

    /// Parse and execute one JSON request line
    pub fn handle_json(&mut self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(e) => MonitorError::from(e).into(),
        }
    }

    fn try_handle(&mut self, request: Request) -> Result<Response, MonitorError> {
        let response = match request {
            Request::Add(form) => Response::Added(self.add_reading_form(&form)?),
            Request::AddPredicted(form) => Response::AddedPredicted {
                status: self.add_predicted(form.parse()?),
            },
            Request::Predict(form) => Response::Prediction {
                predicted_status: self.predict_only(&form.parse()?),
            },
            Request::Score(form) => {
                let (health_score, status) = self.score(&form.parse()?);
                Response::Score {
                    health_score,
                    status,
                }
            }
            Request::Delete { selection } => {
                // Parse the whole selection before deleting anything
                let keys = selection
                    .iter()
                    .map(RowSelection::parse)
                    .collect::<Result<Vec<ReadingKey>, _>>()?;
                Response::Deleted {
                    removed: self.delete(&keys)?,
                }
            }
            Request::Filter { sensor_id } => Response::Readings {
                readings: self.filter(&sensor_id),
            },
            Request::Summary => Response::Summary(self.summary()),
            Request::StatusCounts => Response::StatusCounts(self.status_counts()),
            Request::StressSeries => Response::StressSeries {
                series: self.stress_series(),
            },
            Request::Export => Response::Readings {
                readings: self.export_snapshot(),
            },
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use pretty_assertions::assert_eq;

    fn monitor() -> SensorMonitor {
        SensorMonitor::bootstrap(MonitorConfig::default()).unwrap()
    }

    fn error_code(response: &Response) -> Option<&str> {
        match response {
            Response::Error { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    #[test]
    fn test_add_request_json() {
        let mut monitor = monitor();
        let response = monitor.handle_json(
            r#"{"op":"add","sensor_id":"S1","timestamp":"2025-04-28 13:00","temperature":"37.0","stress":"13.0","displacement":"0.0022"}"#,
        );
        match response {
            Response::Added(outcome) => {
                assert_eq!(outcome.health_score, 94.67);
                assert_eq!(outcome.status, Status::Healthy);
            }
            other => panic!("unexpected response {other:?}"),
        }
        assert_eq!(monitor.store().len(), 7);
    }

    #[test]
    fn test_bad_timestamp_reports_and_inserts_nothing() {
        let mut monitor = monitor();
        let response = monitor.handle_json(
            r#"{"op":"add","sensor_id":"S1","timestamp":"13:00","temperature":"37.0","stress":"13.0","displacement":"0.0022"}"#,
        );
        assert_eq!(error_code(&response), Some("INVALID_TIMESTAMP"));
        assert_eq!(monitor.store().len(), 6);
    }

    #[test]
    fn test_non_finite_measurement_inserts_nothing() {
        let mut monitor = monitor();
        for bad in ["NaN", "inf"] {
            let response = monitor.handle(Request::Add(ReadingForm {
                sensor_id: "S1".to_string(),
                timestamp: "2025-04-28 13:00".to_string(),
                temperature: bad.to_string(),
                stress: "13.0".to_string(),
                displacement: "0.0022".to_string(),
            }));
            assert_eq!(error_code(&response), Some("INVALID_MEASUREMENT"));
        }
        let response = monitor.handle_json(
            r#"{"op":"score","temperature":"NaN","stress":12,"displacement":0.002}"#,
        );
        assert_eq!(error_code(&response), Some("INVALID_MEASUREMENT"));
        assert_eq!(monitor.store().len(), 6);
    }

    #[test]
    fn test_empty_delete_reports_selection_error() {
        let mut monitor = monitor();
        let response = monitor.handle_json(r#"{"op":"delete"}"#);
        assert_eq!(error_code(&response), Some("EMPTY_SELECTION"));
        assert_eq!(monitor.store().len(), 6);
    }

    #[test]
    fn test_delete_with_bad_row_deletes_nothing() {
        let mut monitor = monitor();
        let response = monitor.handle(Request::Delete {
            selection: vec![
                RowSelection {
                    sensor_id: "S1".to_string(),
                    timestamp: "2025-04-28 10:00".to_string(),
                    temperature: "35.2".to_string(),
                },
                RowSelection {
                    sensor_id: "S2".to_string(),
                    timestamp: "2025-04-28 10:00".to_string(),
                    temperature: "hot".to_string(),
                },
            ],
        });
        assert_eq!(error_code(&response), Some("INVALID_MEASUREMENT"));
        assert_eq!(monitor.store().len(), 6);
    }

    #[test]
    fn test_delete_request() {
        let mut monitor = monitor();
        let response = monitor.handle_json(
            r#"{"op":"delete","selection":[{"sensor_id":"S1","timestamp":"2025-04-28 10:00","temperature":35.2}]}"#,
        );
        assert_eq!(response, Response::Deleted { removed: 1 });
        assert_eq!(monitor.store().len(), 5);
    }

    #[test]
    fn test_predict_and_score_do_not_mutate() {
        let mut monitor = monitor();
        let before = monitor.export_snapshot();

        let response = monitor.handle_json(
            r#"{"op":"predict","temperature":35,"stress":12,"displacement":0.002}"#,
        );
        assert_eq!(
            response,
            Response::Prediction {
                predicted_status: Status::Healthy
            }
        );

        let response =
            monitor.handle_json(r#"{"op":"score","temperature":35,"stress":12,"displacement":0.002}"#);
        assert_eq!(
            response,
            Response::Score {
                health_score: 100.0,
                status: Status::Healthy
            }
        );

        assert_eq!(monitor.export_snapshot(), before);
    }

    #[test]
    fn test_filter_and_export() {
        let mut monitor = monitor();
        match monitor.handle_json(r#"{"op":"filter","sensor_id":"S2"}"#) {
            Response::Readings { readings } => assert_eq!(readings.len(), 2),
            other => panic!("unexpected response {other:?}"),
        }
        match monitor.handle_json(r#"{"op":"filter"}"#) {
            Response::Readings { readings } => assert_eq!(readings.len(), 6),
            other => panic!("unexpected response {other:?}"),
        }
        match monitor.handle(Request::Export) {
            Response::Readings { readings } => assert_eq!(readings, monitor.export_snapshot()),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn test_summary_and_status_counts() {
        let mut monitor = monitor();
        match monitor.handle(Request::Summary) {
            Response::Summary(summary) => {
                assert_eq!(summary.highest_mean_stress.as_deref(), Some("S2"))
            }
            other => panic!("unexpected response {other:?}"),
        }
        assert_eq!(
            monitor.handle(Request::StatusCounts),
            Response::StatusCounts(StatusCounts {
                healthy: 4,
                unhealthy: 2
            })
        );
    }

    #[test]
    fn test_unknown_op_is_json_error() {
        let mut monitor = monitor();
        let response = monitor.handle_json(r#"{"op":"retrain"}"#);
        assert_eq!(error_code(&response), Some("JSON_ERROR"));
    }

    #[test]
    fn test_response_wire_format() {
        let json = serde_json::to_value(Response::Prediction {
            predicted_status: Status::Unhealthy,
        })
        .unwrap();
        assert_eq!(json["result"], "prediction");
        assert_eq!(json["predicted_status"], 0);
    }
}
