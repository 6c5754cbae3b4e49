//! The raw field snapshot the router returns for one polling cycle.
//!
//! Everything is a string on the wire, empty when the router has nothing to
//! say. serde's defaults make a missing key identical to an empty string,
//! which is exactly how the update policies treat both.

use serde::{Deserialize, Serialize};

/// Comma-joined field list the transport requests each cycle. Kept next to
/// [`DeviceInfo`] so the two stay in sync.
pub const DEVICE_INFO_FIELDS: &str = concat!(
    "loginfo,",
    "wan_active_band,wan_lte_ca,network_type,ppp_connect_time,",
    "bandwidth,tx_power,",
    "lte_multi_ca_scell_info,lte_multi_ca_scell_sig_info,",
    "lte_band,lte_rsrq,lte_rssi,",
    "lte_ca_pcell_band,lte_ca_pcell_freq,lte_ca_pcell_bandwidth,",
    "lte_rsrp_1,lte_rsrp_2,lte_rsrp_3,lte_rsrp_4,",
    "lte_snr_1,lte_snr_2,lte_snr_3,lte_snr_4,",
    "lte_pci,",
    "5g_rx0_rsrp,5g_rx1_rsrp,Z5g_rsrq,Z5g_rsrp,Z5g_SINR,",
    "nr5g_pci,nr5g_action_channel,nr5g_action_band,nr5g_action_nsa_band,",
    "nr_ca_pcell_band,nr_ca_pcell_freq,nr_multi_ca_scell_info,",
    "nr5g_sa_band_lock,nr5g_nsa_band_lock,",
    "realtime_rx_bytes",
);

/// One deserialized snapshot of the router's diagnostic fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    /// Session validity indicator; empty once the router logged us out.
    pub loginfo: String,

    pub wan_active_band: String,
    pub wan_lte_ca: String,
    pub network_type: String,
    pub ppp_connect_time: String,

    pub bandwidth: String,
    pub tx_power: String,

    pub lte_multi_ca_scell_info: String,
    pub lte_multi_ca_scell_sig_info: String,
    pub lte_band: String,
    pub lte_rsrq: String,
    pub lte_rssi: String,
    pub lte_ca_pcell_band: String,
    pub lte_ca_pcell_freq: String,
    pub lte_ca_pcell_bandwidth: String,
    pub lte_rsrp_1: String,
    pub lte_rsrp_2: String,
    pub lte_rsrp_3: String,
    pub lte_rsrp_4: String,
    pub lte_snr_1: String,
    pub lte_snr_2: String,
    pub lte_snr_3: String,
    pub lte_snr_4: String,
    pub lte_pci: String,

    #[serde(rename = "5g_rx0_rsrp")]
    pub nr_rx0_rsrp: String,
    #[serde(rename = "5g_rx1_rsrp")]
    pub nr_rx1_rsrp: String,
    #[serde(rename = "Z5g_rsrp")]
    pub z5g_rsrp: String,
    #[serde(rename = "Z5g_rsrq")]
    pub z5g_rsrq: String,
    #[serde(rename = "Z5g_SINR")]
    pub z5g_sinr: String,

    pub nr5g_pci: String,
    pub nr5g_action_channel: String,
    pub nr5g_action_band: String,
    pub nr5g_action_nsa_band: String,
    pub nr_ca_pcell_band: String,
    pub nr_ca_pcell_freq: String,
    pub nr_multi_ca_scell_info: String,
    pub nr5g_sa_band_lock: String,
    pub nr5g_nsa_band_lock: String,

    pub realtime_rx_bytes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_deserialize_as_empty() {
        let info: DeviceInfo =
            serde_json::from_str(r#"{"network_type":"LTE","lte_pci":"16a"}"#).unwrap();
        assert_eq!(info.network_type, "LTE");
        assert_eq!(info.lte_pci, "16a");
        assert_eq!(info.wan_lte_ca, "");
        assert_eq!(info.nr5g_pci, "");
    }

    #[test]
    fn renamed_vendor_keys_map() {
        let info: DeviceInfo = serde_json::from_str(
            r#"{"5g_rx0_rsrp":"-80.1","Z5g_SINR":"18.0","Z5g_rsrq":"-11.0"}"#,
        )
        .unwrap();
        assert_eq!(info.nr_rx0_rsrp, "-80.1");
        assert_eq!(info.z5g_sinr, "18.0");
        assert_eq!(info.z5g_rsrq, "-11.0");
    }

    #[test]
    fn requested_fields_cover_the_struct() {
        // Every key serde emits for DeviceInfo must be requested from the
        // router, otherwise the policies would silently read empty strings.
        let value = serde_json::to_value(DeviceInfo::default()).unwrap();
        for key in value.as_object().unwrap().keys() {
            assert!(
                DEVICE_INFO_FIELDS.split(',').any(|f| f == key),
                "field {key} missing from DEVICE_INFO_FIELDS"
            );
        }
    }
}
