use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::json;

use crate::config::LogFormat;
use crate::constants::cosmetic;
use crate::selector::EndpointTuple;

const NESSUS_PLUGINS: &[(u32, &str, u8)] = &[
    (10863, "SSL Certificate Information", 0),
    (11219, "Nessus SYN scanner", 0),
    (51192, "SSL Certificate Cannot Be Trusted", 5),
    (57582, "SSL Self-Signed Certificate", 5),
    (104743, "TLS Version 1.0 Protocol Detection", 5),
    (42873, "SSL Medium Strength Cipher Suites Supported", 7),
    (97833, "MS17-010: Security Update for Microsoft Windows SMB Server", 10),
];

/// Renders endpoint tuples into vendor-style log lines
pub struct MessageFormatter {
    rng: StdRng,
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageFormatter {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Render one event. `None` selects the generic fallback line.
    pub fn render(
        &mut self,
        tuple: &EndpointTuple,
        format: Option<LogFormat>,
        collector: &str,
        timestamp: DateTime<Utc>,
    ) -> String {
        match format {
            Some(LogFormat::CiscoAsa) => self.cisco_asa(tuple, collector, timestamp),
            Some(LogFormat::SnareWindows) => self.snare_windows(tuple, collector, timestamp),
            Some(LogFormat::WindowsXml) => self.windows_xml(tuple, collector, timestamp),
            Some(LogFormat::Aws) => self.aws(tuple, timestamp),
            Some(LogFormat::Nessus) => self.nessus(tuple, collector, timestamp),
            Some(LogFormat::Netflow) => self.netflow(tuple, collector, timestamp),
            Some(LogFormat::EStreamer) => self.estreamer(tuple, collector, timestamp),
            Some(LogFormat::CheckPoint) => self.check_point(tuple, collector, timestamp),
            None => generic(tuple, timestamp),
        }
    }

    fn cisco_asa(&mut self, t: &EndpointTuple, collector: &str, ts: DateTime<Utc>) -> String {
        let (_, proto) = protocol_for(t.destination_port);
        format!(
            "<166>{} {} : %ASA-6-302013: Built inbound {} connection {} for outside:{}/{} ({}/{}) to inside:{}/{} ({}/{})",
            ts.format("%b %d %Y %H:%M:%S"),
            collector,
            proto,
            self.connection_id(),
            t.source,
            t.source_port,
            t.source,
            t.source_port,
            t.destination,
            t.destination_port,
            t.destination,
            t.destination_port,
        )
    }

    fn snare_windows(&mut self, t: &EndpointTuple, collector: &str, ts: DateTime<Utc>) -> String {
        let (proto_num, _) = protocol_for(t.destination_port);
        format!(
            "<14>{} {} MSWinEventLog\t1\tSecurity\t{}\t{}\t5156\tMicrosoft-Windows-Security-Auditing\tN/A\tN/A\tSuccess Audit\t{}\tFiltering Platform Connection\t\tThe Windows Filtering Platform has permitted a connection. Process ID: {} Direction: Inbound Source Address: {} Source Port: {} Destination Address: {} Destination Port: {} Protocol: {}\t{}",
            ts.format("%b %d %H:%M:%S"),
            collector,
            self.event_id(),
            ts.format("%a %b %d %H:%M:%S %Y"),
            collector,
            self.rng.gen_range(1000..=9999),
            t.source,
            t.source_port,
            t.destination,
            t.destination_port,
            proto_num,
            self.connection_id(),
        )
    }

    fn windows_xml(&mut self, t: &EndpointTuple, collector: &str, ts: DateTime<Utc>) -> String {
        let (proto_num, _) = protocol_for(t.destination_port);
        format!(
            "<Event xmlns='http://schemas.microsoft.com/win/2004/08/events/event'><System><Provider Name='Microsoft-Windows-Security-Auditing' Guid='{{54849625-5478-4994-A5BA-3E3B0328C30D}}'/><EventID>5156</EventID><Version>1</Version><Level>0</Level><Task>12810</Task><Keywords>0x8020000000000000</Keywords><TimeCreated SystemTime='{}'/><EventRecordID>{}</EventRecordID><Channel>Security</Channel><Computer>{}</Computer></System><EventData><Data Name='ProcessID'>{}</Data><Data Name='Direction'>%%14592</Data><Data Name='SourceAddress'>{}</Data><Data Name='SourcePort'>{}</Data><Data Name='DestAddress'>{}</Data><Data Name='DestPort'>{}</Data><Data Name='Protocol'>{}</Data></EventData></Event>",
            ts.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
            self.connection_id(),
            collector,
            self.rng.gen_range(1000..=9999),
            t.source,
            t.source_port,
            t.destination,
            t.destination_port,
            proto_num,
        )
    }

    fn aws(&mut self, t: &EndpointTuple, ts: DateTime<Utc>) -> String {
        let (proto_num, _) = protocol_for(t.destination_port);
        let end = ts.timestamp();
        let start = end - self.rng.gen_range(1..=60);
        json!({
            "version": 2,
            "account-id": self.rng.gen_range(100_000_000_000u64..=999_999_999_999u64).to_string(),
            "interface-id": format!("eni-{:017x}", self.rng.r#gen::<u64>() >> 4),
            "srcaddr": t.source.to_string(),
            "dstaddr": t.destination.to_string(),
            "srcport": t.source_port,
            "dstport": t.destination_port,
            "protocol": proto_num,
            "packets": self.rng.gen_range(cosmetic::PACKETS_MIN..=cosmetic::PACKETS_MAX),
            "bytes": self.bytes(),
            "start": start,
            "end": end,
            "action": "ACCEPT",
            "log-status": "OK",
        })
        .to_string()
    }

    fn nessus(&mut self, t: &EndpointTuple, collector: &str, ts: DateTime<Utc>) -> String {
        let &(plugin_id, plugin_name, severity) = NESSUS_PLUGINS
            .choose(&mut self.rng)
            .unwrap_or(&NESSUS_PLUGINS[0]);
        let (_, proto) = protocol_for(t.destination_port);
        format!(
            "CEF:0|Tenable|Nessus|10.6.1|{}|{}|{}|rt={} src={} spt={} dst={} dpt={} proto={} dvchost={} cs1Label=ScanID cs1={}",
            plugin_id,
            plugin_name,
            severity,
            ts.timestamp_millis(),
            t.source,
            t.source_port,
            t.destination,
            t.destination_port,
            proto,
            collector,
            self.event_id(),
        )
    }

    fn netflow(&mut self, t: &EndpointTuple, collector: &str, ts: DateTime<Utc>) -> String {
        let (proto_num, _) = protocol_for(t.destination_port);
        let last = ts.timestamp_millis();
        let first = (ts - Duration::milliseconds(self.rng.gen_range(10..=30_000))).timestamp_millis();
        format!(
            "NetFlow v9 exporter={} seq={} src_addr={} src_port={} dst_addr={} dst_port={} proto={} in_bytes={} in_pkts={} first_switched={} last_switched={}",
            collector,
            self.connection_id(),
            t.source,
            t.source_port,
            t.destination,
            t.destination_port,
            proto_num,
            self.bytes(),
            self.rng.gen_range(cosmetic::PACKETS_MIN..=cosmetic::PACKETS_MAX),
            first,
            last,
        )
    }

    fn estreamer(&mut self, t: &EndpointTuple, collector: &str, ts: DateTime<Utc>) -> String {
        let (proto_num, _) = protocol_for(t.destination_port);
        format!(
            "<134>{} {} eStreamer: rec_type=71 rec_type_desc=\"Connection Statistics\" event_sec={} connection_id={} initiator_ipaddr={} initiator_port={} responder_ipaddr={} responder_port={} protocol={} initiator_bytes={} responder_bytes={} action=Allow",
            ts.format("%b %d %H:%M:%S"),
            collector,
            ts.timestamp(),
            self.connection_id(),
            t.source,
            t.source_port,
            t.destination,
            t.destination_port,
            proto_num,
            self.bytes(),
            self.bytes(),
        )
    }

    fn check_point(&mut self, t: &EndpointTuple, collector: &str, ts: DateTime<Utc>) -> String {
        let (proto_num, _) = protocol_for(t.destination_port);
        format!(
            "<134>1 {} {} CheckPoint {} - [action:\"Accept\"; flags:\"{}\"; ifdir:\"inbound\"; ifname:\"eth1\"; loguid:\"{{0x{:x},0x0,0x{:x},0x0}}\"; origin:\"{}\"; time:\"{}\"; version:\"5\"; dst:\"{}\"; inzone:\"External\"; outzone:\"Internal\"; product:\"VPN-1 & FireWall-1\"; proto:\"{}\"; s_port:\"{}\"; service:\"{}\"; src:\"{}\"]",
            ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            collector,
            self.rng.gen_range(1000..=99999),
            self.event_id(),
            self.rng.r#gen::<u32>(),
            self.rng.r#gen::<u32>(),
            collector,
            ts.timestamp(),
            t.destination,
            proto_num,
            t.source_port,
            t.destination_port,
            t.source,
        )
    }

    fn connection_id(&mut self) -> u32 {
        self.rng.gen_range(cosmetic::CONNECTION_ID_MIN..=cosmetic::CONNECTION_ID_MAX)
    }

    fn event_id(&mut self) -> u32 {
        self.rng.gen_range(cosmetic::EVENT_ID_MIN..=cosmetic::EVENT_ID_MAX)
    }

    fn bytes(&mut self) -> u32 {
        self.rng.gen_range(cosmetic::BYTES_MIN..=cosmetic::BYTES_MAX)
    }
}

fn generic(t: &EndpointTuple, ts: DateTime<Utc>) -> String {
    format!(
        "{} {} -> {} : No specific log type",
        ts.format("%Y-%m-%d %H:%M:%S"),
        t.source,
        t.destination
    )
}

/// DNS is modelled as UDP, everything else as TCP.
fn protocol_for(port: u16) -> (u8, &'static str) {
    match port {
        53 => (17, "UDP"),
        _ => (6, "TCP"),
    }
}
