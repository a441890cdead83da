use serde::{ Deserialize, Deserializer, Serialize };
use serde_json::{ Map, Value as JsonValue };

/// Structured business analysis returned by the assistant once it has enough
/// information about the user's idea.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestions: Vec<Suggestion>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub monetization: Vec<MonetizationStream>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub revenue_estimates: RevenueEstimates,
    #[serde(default, deserialize_with = "null_as_default")]
    pub go_to_market: Vec<GoToMarketChannel>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default, deserialize_with = "string_or_number")]
    pub direction: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonetizationStream {
    #[serde(default, deserialize_with = "string_or_number")]
    pub stream: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub rationale: String,
}

/// Two reply revisions disagree on this field: older ones send a flat
/// `{channel: value}` object, newer ones a list of per-stream ranges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RevenueEstimates {
    ByStream(Vec<StreamEstimate>),
    ByChannel(Map<String, JsonValue>),
}

impl Default for RevenueEstimates {
    fn default() -> Self {
        RevenueEstimates::ByChannel(Map::new())
    }
}

impl RevenueEstimates {
    pub fn is_empty(&self) -> bool {
        match self {
            RevenueEstimates::ByStream(streams) => streams.is_empty(),
            RevenueEstimates::ByChannel(channels) => channels.is_empty(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreamEstimate {
    #[serde(default, deserialize_with = "string_or_number")]
    pub stream: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub estimates: EstimateRange,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimateRange {
    #[serde(default, deserialize_with = "string_or_number")]
    pub low: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub likely: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub high: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoToMarketChannel {
    #[serde(default, deserialize_with = "string_or_number")]
    pub channel: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub success_percentage: String,
}

/// Renders a JSON scalar the way it would read in a sentence: strings without
/// quotes, everything else in its JSON form.
pub fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// Sections sent as `null` read as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where D: Deserializer<'de>, T: Deserialize<'de> + Default
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error> where D: Deserializer<'de> {
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Ok(String::new()),
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number, got {}", other))),
    }
}
