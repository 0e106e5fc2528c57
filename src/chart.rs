use serde::Serialize;
use serde_json::{json, Value};

// =============================================================================
// Chart specifications handed to a renderer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Line => "line",
        }
    }
}

/// One pie wedge: a distinct grouping value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartData {
    /// Parallel category/value arrays, index-aligned with the dataset.
    Series {
        categories: Vec<String>,
        values: Vec<f64>,
    },
    /// Name/count pairs in first-seen order.
    Grouped(Vec<Slice>),
}

/// Declarative description of a single chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub data: ChartData,
}

impl ChartSpec {
    pub fn series(&self) -> Option<(&[String], &[f64])> {
        match &self.data {
            ChartData::Series { categories, values } => Some((categories, values)),
            ChartData::Grouped(_) => None,
        }
    }

    pub fn slices(&self) -> Option<&[Slice]> {
        match &self.data {
            ChartData::Grouped(slices) => Some(slices),
            ChartData::Series { .. } => None,
        }
    }

    /// Option object for ECharts `setOption`.
    pub fn to_echarts_option(&self) -> Value {
        match (&self.kind, &self.data) {
            (ChartKind::Pie, ChartData::Grouped(slices)) => json!({
                "title": { "text": self.title, "left": "center" },
                "tooltip": { "trigger": "item" },
                "series": [{
                    "type": "pie",
                    "radius": "60%",
                    "data": slices,
                }],
            }),
            (kind, ChartData::Series { categories, values }) => {
                let mut option = json!({
                    "title": { "text": self.title },
                    "xAxis": { "type": "category", "data": categories },
                    "yAxis": { "type": "value" },
                    "series": [{
                        "type": kind.as_str(),
                        "data": values,
                    }],
                });
                // The bar chart carries a default tooltip, the line chart none.
                if *kind == ChartKind::Bar {
                    option["tooltip"] = json!({});
                }
                option
            }
            (kind, ChartData::Grouped(slices)) => json!({
                "title": { "text": self.title },
                "series": [{ "type": kind.as_str(), "data": slices }],
            }),
        }
    }
}

/// The three bound charts keyed by their mount points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub chart1: ChartSpec,
    pub chart2: ChartSpec,
    pub chart3: ChartSpec,
}

impl Dashboard {
    /// (mount point id, spec) in display order.
    pub fn mounts(&self) -> [(&'static str, &ChartSpec); 3] {
        [
            ("chart1", &self.chart1),
            ("chart2", &self.chart2),
            ("chart3", &self.chart3),
        ]
    }

    pub fn to_echarts_options(&self) -> Value {
        let mut out = serde_json::Map::new();
        for (id, spec) in self.mounts() {
            out.insert(id.to_string(), spec.to_echarts_option());
        }
        Value::Object(out)
    }
}
