//! Weather lookup coordinator.
//!
//! Picks one source per load (explicit city, persisted last city, device
//! position), fetches, and publishes the result into the display record.
//! Sources are alternatives chosen by availability; a failed fetch never
//! falls through to the next source.

use chrono::{DateTime, Local, TimeDelta, TimeZone};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    FetchError, KeyValueStore, LocationProvider, WeatherClient, WeatherInfo, WeatherQuery,
    store::LAST_CITY_KEY,
};

/// What a call to [`WeatherCoordinator::load_data`] ended up doing.
///
/// Only `Updated` touches the display record.
#[derive(Debug)]
pub enum LoadOutcome {
    Updated(WeatherQuery),
    /// The API answered with something that was not a weather document.
    NoData(WeatherQuery),
    /// No explicit city, no persisted city and no device position.
    NoSource,
    Failed {
        query: WeatherQuery,
        error: FetchError,
    },
    /// A load issued later was applied first; this result was dropped.
    Superseded(WeatherQuery),
}

impl LoadOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, LoadOutcome::Updated(_))
    }

    pub fn query(&self) -> Option<&WeatherQuery> {
        match self {
            LoadOutcome::Updated(q) | LoadOutcome::NoData(q) | LoadOutcome::Superseded(q) => {
                Some(q)
            }
            LoadOutcome::Failed { query, .. } => Some(query),
            LoadOutcome::NoSource => None,
        }
    }
}

#[derive(Debug)]
struct Inner {
    client: Arc<dyn WeatherClient>,
    location: Arc<dyn LocationProvider>,
    store: Arc<dyn KeyValueStore>,
    info: watch::Sender<WeatherInfo>,
    issued: AtomicU64,
    applied: AtomicU64,
    /// Serializes last-city writes so they land in issue order.
    persist: Mutex<()>,
}

/// Owns the display record. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct WeatherCoordinator {
    inner: Arc<Inner>,
}

impl WeatherCoordinator {
    pub fn new(
        client: Arc<dyn WeatherClient>,
        location: Arc<dyn LocationProvider>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let (info, _) = watch::channel(WeatherInfo::default());
        Self {
            inner: Arc::new(Inner {
                client,
                location,
                store,
                info,
                issued: AtomicU64::new(0),
                applied: AtomicU64::new(0),
                persist: Mutex::new(()),
            }),
        }
    }

    /// Snapshot of the display record.
    pub fn info(&self) -> WeatherInfo {
        self.inner.info.borrow().clone()
    }

    /// Observe the display record. The receiver sees every applied update and
    /// every change of the explicit city.
    pub fn subscribe(&self) -> watch::Receiver<WeatherInfo> {
        self.inner.info.subscribe()
    }

    /// Set or clear the explicit city used by the next load. Blank names clear it.
    pub fn set_city(&self, city: Option<String>) {
        let city = city
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        self.inner.info.send_if_modified(|info| {
            if info.city_name == city {
                return false;
            }
            info.city_name = city;
            true
        });
    }

    fn select_query(&self) -> Option<WeatherQuery> {
        let explicit = self.inner.info.borrow().city_name.clone();
        if let Some(city) = explicit {
            debug!(%city, "Using explicit city");
            return Some(WeatherQuery::ByName(city));
        }

        if let Some(city) = self
            .inner
            .store
            .get(LAST_CITY_KEY)
            .filter(|c| !c.trim().is_empty())
        {
            debug!(%city, "Using last searched city");
            return Some(WeatherQuery::ByName(city));
        }

        self.inner.location.current_coordinates().map(|coords| {
            debug!(?coords, "Using device position");
            WeatherQuery::ByPosition {
                lat: coords.latitude,
                lon: coords.longitude,
            }
        })
    }

    pub async fn load_data(&self) -> LoadOutcome {
        let Some(query) = self.select_query() else {
            debug!("No city and no position available, nothing to load");
            return LoadOutcome::NoSource;
        };

        let seq = self.inner.issued.fetch_add(1, Ordering::SeqCst) + 1;
        info!(%query, seq, "Loading weather");

        let response = match self.inner.client.fetch(&query).await {
            Ok(Some(response)) => response,
            Ok(None) => {
                info!(%query, "No weather data in response");
                return LoadOutcome::NoData(query);
            }
            Err(error) => {
                warn!(%query, %error, "Weather fetch failed");
                return LoadOutcome::Failed { query, error };
            }
        };

        let mut applied = false;
        self.inner.info.send_if_modified(|info| {
            // Runs under the channel's write lock, so the check and the store
            // cannot interleave with another load's.
            if seq <= self.inner.applied.load(Ordering::SeqCst) {
                return false;
            }
            self.inner.applied.store(seq, Ordering::SeqCst);
            info.apply(&response);
            applied = true;
            true
        });

        if !applied {
            debug!(%query, seq, "Dropping result of superseded load");
            return LoadOutcome::Superseded(query);
        }

        if let Some(city) = response.name.as_deref().filter(|n| !n.trim().is_empty()) {
            self.persist_city(seq, city);
        }

        info!(%query, city = ?response.name, "Weather updated");
        LoadOutcome::Updated(query)
    }

    fn persist_city(&self, seq: u64, city: &str) {
        let _guard = self.inner.persist.lock();
        // A later load may have applied between our apply and this lock; its
        // city is the one the display record shows.
        if seq < self.inner.applied.load(Ordering::SeqCst) {
            debug!(%city, seq, "Skipping last-city write of superseded load");
            return;
        }
        if let Err(e) = self.inner.store.set(LAST_CITY_KEY, city) {
            warn!(%city, error = %e, "Failed to persist last city");
        }
    }

    /// Kelvin to Fahrenheit.
    pub fn convert_to_f(kelvin: f64) -> f64 {
        (kelvin - 273.15) * 9.0 / 5.0 + 32.0
    }

    /// Now, pushed forward by `offset_secs` when given.
    ///
    /// The offset is OpenWeather's seconds-from-UTC value added as a plain
    /// duration to the current instant. Offsets that are not finite or do not
    /// fit a date leave now unshifted.
    pub fn get_date_time(offset_secs: Option<f64>) -> DateTime<Local> {
        shift_by_offset(Local::now(), offset_secs)
    }
}

fn shift_by_offset<Tz: TimeZone>(
    now: DateTime<Tz>,
    offset_secs: Option<f64>,
) -> DateTime<Tz> {
    let Some(offset) = offset_secs else {
        return now;
    };

    let millis = (offset * 1000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        debug!(offset, "Timezone offset out of range, not shifting");
        return now;
    }

    TimeDelta::try_milliseconds(millis as i64)
        .and_then(|delta| now.clone().checked_add_signed(delta))
        .unwrap_or_else(|| {
            debug!(offset, "Timezone offset overflows the date range, not shifting");
            now
        })
}
