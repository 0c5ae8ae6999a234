use std::env;

/// Production endpoint of the KMA short-term forecast service on data.go.kr.
pub const DEFAULT_WEATHER_API_URL: &str =
    "http://apis.data.go.kr/1360000/VilageFcstInfoService_2.0";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub weather_api_url: String,
    pub grid_table_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            api_key: env::var("DATA_GO_KR_API_KEY")?,
            weather_api_url: env::var("WEATHER_API_URL")
                .unwrap_or_else(|_| DEFAULT_WEATHER_API_URL.to_string()),
            grid_table_path: env::var("GRID_TABLE_PATH").ok(),
        })
    }
}
