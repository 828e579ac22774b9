//! Command line interface

use bacrpm_client::{SessionConfig, StaticBinding};
use bacrpm_core::address::DEFAULT_BIP_PORT;
use bacrpm_core::{BacnetAddress, BacnetError, BacnetResult, BROADCAST_NETWORK, MAX_INSTANCE};
use bacrpm_transport::BipSettings;
use clap::Parser;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nCopyright (C) 2014 by Steve Karg and others.\n",
    "This is free software; see the source for copying conditions.\n",
    "There is NO warranty; not even for MERCHANTABILITY or\n",
    "FITNESS FOR A PARTICULAR PURPOSE."
);

const LONG_ABOUT: &str = "\
Read the present-value property from one or more objects in a BACnet device \
and print the value(s). The objects are specified by their names, and the \
object type and object number required for each object are provided in an \
external CSV file. The values are returned in JSON format where each field \
has the name of the corresponding object.";

const MAC_HELP: &str = "\
Valid ranges are from 00 to FF (hex) for MS/TP or ARCNET, or an IP string \
with optional port number like 10.1.2.3:47808 or an Ethernet MAC in hex \
like 00:21:70:7e:32:bb";

#[derive(Debug, Parser)]
#[command(name = "bacrpm", version = VERSION, about = "Read BACnet object values by name", long_about = LONG_ABOUT)]
pub struct Cli {
    /// Optional BACnet network number for directed requests
    ///
    /// Valid range is from 0 to 65535 where 0 is the local connection and
    /// 65535 is network broadcast.
    #[arg(long, value_name = "N", value_parser = parse_integer, allow_hyphen_values = true)]
    pub dnet: Option<i64>,

    /// Optional BACnet MAC address on the destination network
    #[arg(long, value_name = "A", long_help = MAC_HELP)]
    pub dadr: Option<String>,

    /// Optional BACnet MAC address
    #[arg(long, value_name = "A", long_help = MAC_HELP)]
    pub mac: Option<String>,

    /// BACnet Device Object instance number to read from
    ///
    /// Used to bind with the device using Who-Is and I-Am. For example, when
    /// reading Device Object 123 the device instance is 123.
    #[arg(long = "id", value_name = "device-instance", value_parser = parse_integer, allow_hyphen_values = true)]
    pub device_instance: Option<i64>,

    /// CSV file with columns "name", "type_value" and "address"
    #[arg(long, value_name = "object-data-file")]
    pub csv: Option<PathBuf>,

    /// Names of the objects to read, as listed in the CSV file
    #[arg(value_name = "object-name", required = true)]
    pub names: Vec<String>,

    /// APDU timeout in milliseconds
    #[arg(long, env = "BACNET_APDU_TIMEOUT", value_name = "ms", default_value_t = 3000)]
    pub apdu_timeout: u64,

    /// Number of APDU retries
    #[arg(long, env = "BACNET_APDU_RETRIES", default_value_t = 3)]
    pub apdu_retries: u8,

    /// Local BACnet/IP UDP port
    #[arg(long, env = "BACNET_IP_PORT", default_value_t = DEFAULT_BIP_PORT)]
    pub port: u16,

    /// Local IPv4 address to bind
    #[arg(long, env = "BACNET_IFACE", default_value_t = Ipv4Addr::UNSPECIFIED)]
    pub interface: Ipv4Addr,

    /// IPv4 broadcast address for Who-Is
    #[arg(long, env = "BACNET_IP_BROADCAST", default_value_t = Ipv4Addr::BROADCAST)]
    pub broadcast: Ipv4Addr,
}

impl Cli {
    /// Target device instance, which must be below the maximum instance
    pub fn device_instance(&self) -> BacnetResult<u32> {
        let Some(instance) = self.device_instance else {
            return Err(BacnetError::Configuration(
                "The device-instance must be specified with --id".to_string(),
            ));
        };
        match u32::try_from(instance) {
            Ok(instance) if instance < MAX_INSTANCE => Ok(instance),
            _ => Err(BacnetError::Configuration(format!(
                "device-instance={} - it must be less than {}",
                instance, MAX_INSTANCE
            ))),
        }
    }

    pub fn csv_path(&self) -> BacnetResult<&Path> {
        self.csv.as_deref().ok_or_else(|| {
            BacnetError::Configuration("The CSV data file must be specified with --csv".to_string())
        })
    }

    /// Destination from `--mac`, `--dnet` and `--dadr`
    ///
    /// Values that do not parse are ignored, as is a network number outside
    /// 0..=65535.
    pub fn static_binding(&self) -> StaticBinding {
        let dnet = self
            .dnet
            .filter(|dnet| (0..=BROADCAST_NETWORK as i64).contains(dnet))
            .map(|dnet| dnet as u16);
        StaticBinding {
            mac: self.mac.as_deref().and_then(|text| parse_mac_arg("--mac", text)),
            dnet,
            dadr: self.dadr.as_deref().and_then(|text| parse_mac_arg("--dadr", text)),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_apdu_timeout(Duration::from_millis(self.apdu_timeout))
            .with_apdu_retries(self.apdu_retries)
    }

    pub fn bip_settings(&self) -> BipSettings {
        BipSettings::new(self.port)
            .with_interface(self.interface)
            .with_broadcast(self.broadcast)
            .with_timeout(Duration::from_millis(self.apdu_timeout))
    }
}

fn parse_mac_arg(flag: &str, text: &str) -> Option<Vec<u8>> {
    match BacnetAddress::parse_mac(text) {
        Ok(mac) => Some(mac),
        Err(e) => {
            log::warn!("Ignoring {} {}: {}", flag, text, e);
            None
        }
    }
}

/// Parse a decimal or `0x` hexadecimal integer
pub fn parse_integer(text: &str) -> Result<i64, String> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let value = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    }
    .map_err(|e| format!("invalid integer {:?}: {}", text, e))?;
    Ok(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bacrpm_core::LOCAL_NETWORK;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bacrpm").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("123"), Ok(123));
        assert_eq!(parse_integer("0x1F"), Ok(31));
        assert_eq!(parse_integer("-1"), Ok(-1));
        assert!(parse_integer("twelve").is_err());
    }

    #[test]
    fn test_full_command_line() {
        let cli = parse(&["--id", "0x7B", "--csv", "points.csv", "TempRoom1", "TempRoom2"]);
        assert_eq!(cli.device_instance().unwrap(), 123);
        assert_eq!(cli.csv_path().unwrap(), Path::new("points.csv"));
        assert_eq!(cli.names, vec!["TempRoom1", "TempRoom2"]);
        assert!(!cli.static_binding().is_specified());
    }

    #[test]
    fn test_device_instance_bounds() {
        let cli = parse(&["--id", "4194303", "--csv", "p.csv", "A"]);
        let err = cli.device_instance().unwrap_err();
        assert!(err.to_string().contains("device-instance=4194303 - it must be less than 4194303"));

        let cli = parse(&["--csv", "p.csv", "A"]);
        assert!(cli.device_instance().is_err());

        let cli = parse(&["--id", "4194302", "A"]);
        assert_eq!(cli.device_instance().unwrap(), 4194302);
        assert!(cli.csv_path().is_err());
    }

    #[test]
    fn test_names_required() {
        assert!(Cli::try_parse_from(["bacrpm", "--id", "1", "--csv", "p.csv"]).is_err());
    }

    #[test]
    fn test_static_binding() {
        let cli = parse(&["--mac", "10.0.0.5", "--id", "1", "--csv", "p.csv", "A"]);
        let binding = cli.static_binding();
        assert!(binding.is_specified());
        assert_eq!(binding.to_address().net, LOCAL_NETWORK);
        assert_eq!(binding.mac, Some(vec![10, 0, 0, 5, 0xBA, 0xC0]));

        let cli = parse(&["--dnet", "70000", "--mac", "bogus", "--id", "1", "--csv", "p.csv", "A"]);
        assert!(!cli.static_binding().is_specified());

        let cli = parse(&["--dnet", "5", "--dadr", "7f", "--mac", "10.0.0.1", "--id", "1", "--csv", "p.csv", "A"]);
        let address = cli.static_binding().to_address();
        assert_eq!(address.net, 5);
        assert_eq!(address.adr, vec![0x7F]);
    }

    #[test]
    fn test_session_config_from_flags() {
        let cli = parse(&["--apdu-timeout", "2000", "--apdu-retries", "2", "--id", "1", "A"]);
        let config = cli.session_config();
        assert_eq!(config.binding_timeout_seconds(), 4);
        assert_eq!(cli.bip_settings().timeout, Some(Duration::from_millis(2000)));
    }
}
