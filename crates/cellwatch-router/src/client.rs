//! Session-level client: login, keepalive, field snapshots, and the
//! management commands the firmware exposes through `goform` set requests.

use std::time::{Duration, Instant};

use cellwatch_core::fields::{DeviceInfo, DEVICE_INFO_FIELDS};
use cellwatch_core::value::first_number;

use crate::error::RouterError;
use crate::hash;
use crate::http::RouterHttp;

/// Models that moved to the reworked API: SHA-256 request hashes and a
/// developer login for some settings.
const NEW_API_MODELS: &[&str] = &["MC888", "MC889"];

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);
const LOGIN_RETRY_DELAY: Duration = Duration::from_secs(20);

/// Factory default the firmware falls back to when unlocking all LTE bands.
const DEFAULT_LTE_BAND_MASK: i64 = 0xA3E2AB0908DF;

const DEFAULT_NR_BANDS: &str =
    "1,2,3,5,7,8,20,28,38,41,50,51,66,70,71,74,75,76,77,78,79,80,81,82,83,84";

/// Outcome codes of a login set request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginCode {
    Ok,
    TryAgainLater,
    DuplicateUser,
    WrongPassword,
    Failure,
}

impl LoginCode {
    fn from_result(result: &str) -> Self {
        match result {
            "0" => LoginCode::Ok,
            "1" => LoginCode::TryAgainLater,
            "2" => LoginCode::DuplicateUser,
            "3" => LoginCode::WrongPassword,
            _ => LoginCode::Failure,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            LoginCode::Ok => "login success",
            LoginCode::TryAgainLater => "try again later",
            LoginCode::DuplicateUser => "duplicate user",
            LoginCode::WrongPassword => "wrong password",
            LoginCode::Failure => "login failure",
        }
    }
}

/// Authenticated session with one router.
#[derive(Debug)]
pub struct RouterClient {
    http: RouterHttp,
    password: String,
    new_api: bool,
    logged_in: bool,
    successful_logins: u32,
    last_keepalive: Option<Instant>,
}

impl RouterClient {
    /// Connect to the router and probe which API generation it runs.
    pub async fn connect(ip: &str, password: &str) -> Result<Self, RouterError> {
        let http = RouterHttp::connect(ip).await?;
        let mut client = Self {
            http,
            password: password.to_string(),
            new_api: false,
            logged_in: false,
            successful_logins: 0,
            last_keepalive: None,
        };
        client.detect_generation().await;
        Ok(client)
    }

    /// A failed probe leaves the client on the old API, which every model
    /// at least answers to.
    async fn detect_generation(&mut self) {
        match self.http.get_cmd("wa_inner_version").await {
            Ok(json) => {
                let version = json
                    .get("wa_inner_version")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_uppercase();
                self.new_api = NEW_API_MODELS.iter().any(|m| version.contains(m));
                tracing::debug!(%version, new_api = self.new_api, "router generation probed");
            }
            Err(e) => tracing::warn!(error = %e, "could not probe router generation"),
        }
    }

    /// Hash used by set-request tokens; generation dependent.
    fn api_hash(&self, text: &str) -> String {
        if self.new_api {
            hash::sha256_upper(text)
        } else {
            hash::md5_upper(text)
        }
    }

    /// Read a single named value, treating an empty string as missing.
    async fn get_nv(&self, key: &str) -> Result<String, RouterError> {
        let json = self.http.get_cmd(key).await?;
        match json.get(key).and_then(|v| v.as_str()) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(RouterError::MissingField(key.to_string())),
        }
    }

    /// Anti-CSRF token set requests must carry:
    /// `H(H(wa_inner_version + cr_version) + RD)`.
    async fn calculate_ad(&self) -> Result<String, RouterError> {
        let json = self.http.get_cmd("wa_inner_version,cr_version,RD").await?;
        let field =
            |key: &str| json.get(key).and_then(|v| v.as_str()).unwrap_or("").to_string();
        let inner = self.api_hash(&format!("{}{}", field("wa_inner_version"), field("cr_version")));
        Ok(self.api_hash(&format!("{inner}{}", field("RD"))))
    }

    async fn set_request(
        &self,
        goform_id: &'static str,
        with_ad: bool,
    ) -> Result<Vec<(&'static str, String)>, RouterError> {
        let mut form = vec![("goformId", goform_id.to_string())];
        if with_ad {
            form.push(("AD", self.calculate_ad().await?));
        }
        Ok(form)
    }

    // ── Login ───────────────────────────────────────────────────────────

    async fn login_once(&mut self, developer: bool) -> Result<LoginCode, RouterError> {
        let ld = self.get_nv("LD").await?;
        let digest = hash::login_hash(&self.password, &ld);

        // Plain login skips the AD token; the developer login needs it.
        let goform_id = if developer { "DEVELOPER_OPTION_LOGIN" } else { "LOGIN" };
        let mut form = self.set_request(goform_id, developer).await?;
        form.push(("password", digest));

        let json = self.http.set_cmd(&form).await?;
        let result = json.get("result").and_then(|v| v.as_str()).unwrap_or("");
        let code = LoginCode::from_result(result);

        if code == LoginCode::Ok {
            self.logged_in = true;
            self.successful_logins += 1;
        } else {
            tracing::warn!(developer, code = code.message(), "login rejected");
        }
        Ok(code)
    }

    pub async fn login(&mut self) -> Result<LoginCode, RouterError> {
        let code = self.login_once(false).await?;
        if self.new_api && code == LoginCode::Ok {
            // Some settings on new-API models only apply from a developer
            // session; a failure here leaves the normal session usable.
            if let Err(e) = self.login_once(true).await {
                tracing::warn!(error = %e, "developer login failed");
            }
        }
        Ok(code)
    }

    /// Block until a session is established. A wrong password aborts
    /// instead of hammering the router; everything else retries.
    pub async fn ensure_login(&mut self) -> Result<(), RouterError> {
        while !self.logged_in {
            if self.successful_logins >= 1 {
                // The session was dropped; give the router a moment before
                // logging in again.
                tracing::info!(
                    delay_s = LOGIN_RETRY_DELAY.as_secs(),
                    "waiting before the next login attempt"
                );
                tokio::time::sleep(LOGIN_RETRY_DELAY).await;
            }

            match self.login().await {
                Ok(LoginCode::Ok) => break,
                Ok(LoginCode::WrongPassword) => return Err(RouterError::WrongPassword),
                Ok(_) => tokio::time::sleep(Duration::from_secs(1)).await,
                Err(e) => {
                    tracing::warn!(error = %e, "login attempt failed");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
        Ok(())
    }

    pub fn logged_in(&self) -> bool {
        self.logged_in
    }

    /// Touch an authenticated page to reset the router's auto-logout
    /// timer; rate-limited to once a minute. Failures are harmless — the
    /// next device-info fetch notices a dead session anyway.
    pub async fn keepalive(&mut self) {
        let due = self
            .last_keepalive
            .is_none_or(|t| t.elapsed() >= KEEPALIVE_INTERVAL);
        if !due {
            return;
        }
        if let Err(e) = self.http.get_raw("tmpl/network/apn_setting.html").await {
            tracing::debug!(error = %e, "keepalive request failed");
        }
        self.last_keepalive = Some(Instant::now());
    }

    // ── Device info ─────────────────────────────────────────────────────

    /// Fetch one diagnostic snapshot. An empty `loginfo` means the router
    /// silently dropped the session; the caller should `ensure_login` and
    /// try again.
    pub async fn fetch_device_info(&mut self) -> Result<DeviceInfo, RouterError> {
        let json = self.http.get_cmd(DEVICE_INFO_FIELDS).await?;
        let info: DeviceInfo = serde_json::from_value(json)?;
        if info.loginfo.is_empty() {
            self.logged_in = false;
            return Err(RouterError::SessionExpired);
        }
        Ok(info)
    }

    /// Fetch an arbitrary command's raw JSON, for poking at the API.
    pub async fn debug_cmd(&self, cmd: &str) -> Result<serde_json::Value, RouterError> {
        self.http.get_cmd(cmd).await
    }

    // ── Band locks ──────────────────────────────────────────────────────

    pub async fn lte_band_lock(&self) -> Result<Vec<i32>, RouterError> {
        Ok(parse_band_list(&self.get_nv("lte_band_lock").await?))
    }

    /// Lock LTE to `bands`, or restore the factory default mask with
    /// `None`. Bands outside 1..=64 cannot exist in the mask and are
    /// ignored.
    pub async fn set_lte_band_lock(&self, bands: Option<&[i32]>) -> Result<(), RouterError> {
        let mask: i64 = match bands {
            Some(bands) => bands
                .iter()
                .filter(|b| (1..=64).contains(*b))
                .fold(0, |mask, b| mask | (1i64 << (b - 1))),
            None => DEFAULT_LTE_BAND_MASK,
        };

        let mut form = self.set_request("BAND_SELECT", true).await?;
        form.push(("is_gw_band", "0".to_string()));
        form.push(("gw_band_mask", "0".to_string()));
        form.push(("is_lte_band", "1".to_string()));
        form.push(("lte_band_mask", format!("0x{mask:011X}")));
        self.http.set_ok(&form).await
    }

    pub async fn nr_band_lock(&self) -> Result<Vec<i32>, RouterError> {
        Ok(parse_band_list(&self.get_nv("nr5g_sa_band_lock").await?))
    }

    /// Lock NR to `bands`, or restore the full default list with `None`.
    pub async fn set_nr_band_lock(&self, bands: Option<&[i32]>) -> Result<(), RouterError> {
        let list = match bands {
            Some(bands) => bands
                .iter()
                .map(|b| b.to_string())
                .collect::<Vec<_>>()
                .join(","),
            None => DEFAULT_NR_BANDS.to_string(),
        };

        let mut form = self.set_request("WAN_PERFORM_NR5G_BAND_LOCK", true).await?;
        form.push(("nr5g_band_mask", list));
        self.http.set_ok(&form).await
    }

    /// Force a reconnect onto `second` by locking to `first` and then to
    /// `second` back to back.
    pub async fn nr_band_hop(&self, first: &[i32], second: &[i32]) -> Result<(), RouterError> {
        self.set_nr_band_lock(Some(first)).await?;
        self.set_nr_band_lock(Some(second)).await
    }

    // ── Connection & preference ─────────────────────────────────────────

    pub async fn set_connected(&self, connect: bool) -> Result<(), RouterError> {
        let goform_id = if connect { "CONNECT_NETWORK" } else { "DISCONNECT_NETWORK" };
        let mut form = self.set_request(goform_id, true).await?;
        form.push(("notCallback", "true".to_string()));
        self.http.set_ok(&form).await
    }

    /// Current network preference as the human mode string when the vendor
    /// value is known, the raw vendor value otherwise.
    pub async fn network_preference(&self) -> Result<String, RouterError> {
        let mode = self.get_nv("net_select").await?;
        Ok(vendor_to_preference(&mode).map(str::to_string).unwrap_or(mode))
    }

    pub async fn set_network_preference(&self, mode: &str) -> Result<(), RouterError> {
        let Some(vendor) = preference_to_vendor(mode) else {
            return Err(RouterError::UnknownMode(mode.to_string()));
        };
        let mut form = self.set_request("SET_BEARER_PREFERENCE", true).await?;
        form.push(("BearerPreference", vendor.to_string()));
        self.http.set_ok(&form).await
    }

    /// The mode strings [`RouterClient::set_network_preference`] accepts.
    pub fn known_preferences() -> impl Iterator<Item = &'static str> {
        NETWORK_PREFERENCES.iter().map(|(mode, _)| *mode)
    }
}

// ── Band list handling ──────────────────────────────────────────────────

/// Parse the firmware's band-lock representation: either a `0x`-prefixed
/// 64-bit mask (bit n set → band n+1 locked) or a plain comma list with
/// the occasional `n`/`B` prefix noise.
pub fn parse_band_list(raw: &str) -> Vec<i32> {
    let raw = raw.to_lowercase();
    if let Some(digits) = raw.strip_prefix("0x") {
        let Ok(mask) = i64::from_str_radix(digits, 16) else {
            return Vec::new();
        };
        (0..64).filter(|bit| mask & (1i64 << bit) != 0).map(|bit| bit + 1).collect()
    } else {
        raw.split(',')
            .filter_map(|part| first_number(part).parse().ok())
            .collect()
    }
}

/// Parse a user-supplied band list ("1+3+28", "n41+n78").
pub fn parse_bands_arg(input: &str) -> Vec<i32> {
    input
        .split('+')
        .filter_map(|part| first_number(part).parse().ok())
        .collect()
}

// ── Network preference mapping ──────────────────────────────────────────

const NETWORK_PREFERENCES: &[(&str, &str)] = &[
    ("2G", "Only_GSM"),
    ("2G+3G+4G", "GSM_WCDMA_LTE"),
    ("2G+4G", "GSM_AND_LTE"),
    ("3G", "Only_WCDMA"),
    ("3G+2G", "WCDMA_AND_GSM"),
    ("3G+4G", "WCDMA_AND_LTE"),
    ("3G(TDSCDMA)+4G", "TDSCDMA_AND_LTE"),
    ("4G", "Only_LTE"),
    ("4G+5G", "LTE_AND_5G"),
    ("5G", "Only_5G"),
    ("CDMA+EVDO+4G", "CDMA_EVDO_LTE"),
    ("GWL+5G", "GWL_5G"),
    ("TD-SCDMA+WCDMA+2G+4G", "TDSCDMA_WCDMA_GSM_LTE"),
    ("TD-SCDMA+WCDMA+HDR+CDMA+2G+4G", "TDSCDMA_WCDMA_HDR_CDMA_GSM_LTE"),
    ("TDSCDMA+WCDMA", "TDSCDMA_AND_WCDMA"),
    ("3G_preferred", "WCDMA_preferred"),
    ("TCHGWL+5G", "TCHGWL_5G"),
    ("TGWL+5G", "TGWL_AND_5G"),
    ("WL+5G", "WL_AND_5G"),
    ("LTE", "Only_LTE"),
    ("NSA", "Only_5G"),
    ("SA", "Only_5G"),
];

/// Map a human mode string to the vendor's `BearerPreference` value.
/// The `+`-separated parts match in any order ("5G+4G" equals "4G+5G").
fn preference_to_vendor(mode: &str) -> Option<&'static str> {
    let mut wanted: Vec<String> = mode.to_uppercase().split('+').map(str::to_string).collect();
    wanted.sort();

    NETWORK_PREFERENCES.iter().find_map(|(key, vendor)| {
        let mut parts: Vec<String> = key.to_uppercase().split('+').map(str::to_string).collect();
        parts.sort();
        (parts == wanted).then_some(*vendor)
    })
}

fn vendor_to_preference(vendor: &str) -> Option<&'static str> {
    NETWORK_PREFERENCES
        .iter()
        .find_map(|(mode, v)| (*v == vendor).then_some(*mode))
}
