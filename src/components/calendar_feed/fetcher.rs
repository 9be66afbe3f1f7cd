use crate::error::{fetch_error, BotResult};
use crate::utils::fs::write_atomic;
use crate::utils::time::file_age;
use reqwest::Client;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads the calendar document into the staging file
#[derive(Debug, Clone)]
pub struct CalendarFetcher {
    client: Client,
    url: String,
    staging: PathBuf,
    max_age: Duration,
}

impl CalendarFetcher {
    pub fn new(url: String, staging: PathBuf, max_age: Duration) -> BotResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| fetch_error(&format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            staging,
            max_age,
        })
    }

    /// Fetch the calendar if the staging copy is missing or stale. Returns
    /// whether a download happened.
    ///
    /// A copy is stale once it is half of `max_age` old, so a caller polling
    /// with a period of `max_age` downloads on every tick even though each
    /// write lands a little after its tick.
    pub async fn refresh(&self) -> BotResult<bool> {
        if !self.is_stale().await? {
            debug!("Staging calendar is fresh, skipping download");
            return Ok(false);
        }

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| fetch_error(&format!("Failed to fetch calendar: {}", e)))?;

        if !response.status().is_success() {
            return Err(fetch_error(&format!(
                "Failed to fetch calendar: HTTP {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_error(&format!("Failed to read calendar body: {}", e)))?;

        write_atomic(&self.staging, &body).await?;
        info!("Downloaded calendar ({} bytes)", body.len());
        Ok(true)
    }

    async fn is_stale(&self) -> BotResult<bool> {
        let metadata = match tokio::fs::metadata(&self.staging).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(e.into()),
        };
        let age = file_age(metadata.modified()?, SystemTime::now());
        Ok(age + self.max_age / 2 >= self.max_age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CALENDAR: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";

    #[tokio::test]
    async fn test_fetches_when_staging_missing_then_skips_while_fresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendar.ics"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CALENDAR))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("calendar_new.ics");
        let fetcher = CalendarFetcher::new(
            format!("{}/calendar.ics", server.uri()),
            staging.clone(),
            Duration::from_secs(3600),
        )
        .unwrap();

        assert!(fetcher.refresh().await.unwrap());
        assert!(!fetcher.refresh().await.unwrap());
        assert_eq!(std::fs::read_to_string(&staging).unwrap(), CALENDAR);
    }

    #[tokio::test]
    async fn test_zero_max_age_always_fetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CALENDAR))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = CalendarFetcher::new(
            server.uri(),
            dir.path().join("calendar_new.ics"),
            Duration::ZERO,
        )
        .unwrap();

        assert!(fetcher.refresh().await.unwrap());
        assert!(fetcher.refresh().await.unwrap());
    }

    #[tokio::test]
    async fn test_polling_on_the_same_period_downloads_every_tick() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(CALENDAR)
                    .set_delay(Duration::from_millis(50)),
            )
            .expect(4)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let period = Duration::from_millis(400);
        let fetcher =
            CalendarFetcher::new(server.uri(), dir.path().join("calendar_new.ics"), period)
                .unwrap();

        let mut ticker = tokio::time::interval(period);
        let mut downloads = Vec::new();
        for _ in 0..4 {
            ticker.tick().await;
            downloads.push(fetcher.refresh().await.unwrap());
        }

        assert_eq!(downloads, vec![true; 4]);
    }

    #[tokio::test]
    async fn test_http_error_keeps_previous_staging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("calendar_new.ics");
        std::fs::write(&staging, CALENDAR).unwrap();

        let fetcher = CalendarFetcher::new(server.uri(), staging.clone(), Duration::ZERO).unwrap();

        assert!(fetcher.refresh().await.is_err());
        assert_eq!(std::fs::read_to_string(&staging).unwrap(), CALENDAR);
    }
}
