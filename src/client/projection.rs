//! Read-only projections consumed by views

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::history::HistoryBuffer;
use crate::models::{EventKind, Snapshot};

/// One chart point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsPoint {
    pub timestamp: DateTime<Utc>,
    pub cpu: f64,
    pub memory: f64,
    pub network: f64,
    pub disk: f64,
}

/// Map history into chart points, preserving arrival order
pub fn metrics_series(history: &HistoryBuffer) -> Vec<MetricsPoint> {
    history
        .iter()
        .map(|snapshot| MetricsPoint {
            timestamp: snapshot.timestamp,
            cpu: snapshot.metrics.cpu,
            memory: snapshot.metrics.memory,
            network: snapshot.metrics.network,
            disk: snapshot.metrics.disk,
        })
        .collect()
}

/// Load level shown next to a card value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
    Normal,
}

impl Level {
    fn from_thresholds(value: f64, medium: f64, high: f64) -> Self {
        if value > high {
            Level::High
        } else if value > medium {
            Level::Medium
        } else {
            Level::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
            Level::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Cpu,
    Memory,
    Network,
    Disk,
    ActiveUsers,
}

impl CardKind {
    pub fn title(&self) -> &'static str {
        match self {
            CardKind::Cpu => "CPU Usage",
            CardKind::Memory => "Memory Usage",
            CardKind::Network => "Network Traffic",
            CardKind::Disk => "Disk Usage",
            CardKind::ActiveUsers => "Active Users",
        }
    }
}

/// Headline value for one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub kind: CardKind,
    /// Formatted value, e.g. `42.5%` or `730 MB/s`
    pub value: String,
    pub level: Level,
}

/// Cards for the latest snapshot
pub fn metric_cards(snapshot: &Snapshot) -> Vec<MetricCard> {
    let m = &snapshot.metrics;
    let percent = |kind, value: f64| MetricCard {
        kind,
        value: format!("{:.1}%", value),
        level: Level::from_thresholds(value, 50.0, 80.0),
    };

    vec![
        percent(CardKind::Cpu, m.cpu),
        percent(CardKind::Memory, m.memory),
        MetricCard {
            kind: CardKind::Network,
            value: format!("{:.0} MB/s", m.network),
            level: Level::from_thresholds(m.network, 400.0, 800.0),
        },
        percent(CardKind::Disk, m.disk),
        MetricCard {
            kind: CardKind::ActiveUsers,
            value: snapshot.users.to_string(),
            level: Level::Normal,
        },
    ]
}

/// One row of the recent events table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRow {
    pub kind: EventKind,
    pub message: String,
    /// Local wall-clock time, `HH:MM:SS`
    pub time: String,
}

/// Events of the latest snapshot in arrival order
pub fn recent_events(snapshot: &Snapshot) -> Vec<EventRow> {
    snapshot
        .events
        .iter()
        .map(|event| EventRow {
            kind: event.kind,
            message: event.message.clone(),
            time: event
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, EventId, Metrics};
    use std::sync::Arc;

    fn snapshot(cpu: f64, network: f64) -> Snapshot {
        Snapshot {
            timestamp: Utc::now(),
            metrics: Metrics {
                cpu,
                memory: 50.0,
                network,
                disk: 80.1,
            },
            events: Vec::new(),
            users: 1234,
            transactions: 0,
        }
    }

    #[test]
    fn test_series_preserves_order_and_values() {
        let mut history = HistoryBuffer::new(3);
        for cpu in [10.0, 20.0, 30.0, 40.0] {
            history.push(Arc::new(snapshot(cpu, cpu * 10.0)));
        }

        let series = metrics_series(&history);

        assert_eq!(series.iter().map(|p| p.cpu).collect::<Vec<_>>(), vec![20.0, 30.0, 40.0]);
        assert_eq!(series[0].network, 200.0);
        assert_eq!(series[2].timestamp, history.latest().unwrap().timestamp);
        // Pure: the buffer is untouched and a second call agrees
        assert_eq!(history.len(), 3);
        assert_eq!(metrics_series(&history), series);
    }

    #[test]
    fn test_series_of_empty_history() {
        assert!(metrics_series(&HistoryBuffer::default()).is_empty());
    }

    #[test]
    fn test_card_levels() {
        let cards = metric_cards(&snapshot(81.0, 400.0));

        assert_eq!(cards.len(), 5);
        assert_eq!(cards[0].kind, CardKind::Cpu);
        assert_eq!(cards[0].level, Level::High);
        assert_eq!(cards[0].value, "81.0%");
        // Thresholds are strict
        assert_eq!(cards[1].level, Level::Low);
        assert_eq!(cards[2].level, Level::Low);
        assert_eq!(cards[2].value, "400 MB/s");
        assert_eq!(cards[3].level, Level::High);
        assert_eq!(cards[4].value, "1234");
        assert_eq!(cards[4].level, Level::Normal);
    }

    #[test]
    fn test_network_medium_band() {
        let cards = metric_cards(&snapshot(10.0, 650.0));
        assert_eq!(cards[2].level, Level::Medium);
        assert_eq!(cards[2].kind.title(), "Network Traffic");
        assert_eq!(cards[0].level.as_str(), "low");
    }

    #[test]
    fn test_recent_events_rows() {
        let at = Utc::now();
        let mut sample = snapshot(10.0, 10.0);
        sample.events = vec![
            Event {
                id: EventId::Number(7),
                kind: EventKind::Warning,
                message: "System event 7".to_string(),
                timestamp: at,
            },
            Event {
                id: EventId::Number(8),
                kind: EventKind::Error,
                message: "System event 8".to_string(),
                timestamp: at,
            },
        ];

        let rows = recent_events(&sample);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, EventKind::Warning);
        assert_eq!(rows[0].message, "System event 7");
        assert_eq!(rows[1].kind, EventKind::Error);
        assert_eq!(
            rows[1].time,
            at.with_timezone(&chrono::Local).format("%H:%M:%S").to_string()
        );
        assert!(recent_events(&snapshot(1.0, 1.0)).is_empty());
    }
}
