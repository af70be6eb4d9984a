use crate::lifecycle::LifecycleError;
use std::net::IpAddr;

/// Marker of the job output line that carries the broadcast address.
pub const MESSAGE_MARKER: &str = "\"msg\":";

/// Extract the broadcast address from the output of the `get_broadcast` job.
///
/// Contract: the first line containing `"msg":` holds the address as the
/// first quoted field after the marker, e.g. `"msg": "192.0.2.255"`. This is
/// the only place that knows the job's output format.
pub fn parse_broadcast_address(output: &str) -> Result<IpAddr, LifecycleError> {
    let line = output
        .lines()
        .find(|line| line.contains(MESSAGE_MARKER))
        .ok_or_else(|| LifecycleError::BroadcastParse {
            reason: format!("no line containing {MESSAGE_MARKER}"),
        })?;

    let after_marker = line
        .split_once(MESSAGE_MARKER)
        .map_or("", |(_, rest)| rest);
    let field = after_marker
        .split('"')
        .nth(1)
        .ok_or_else(|| LifecycleError::BroadcastParse {
            reason: format!("no quoted value after marker in line: {}", line.trim()),
        })?;

    field
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| LifecycleError::BroadcastParse {
            reason: format!("'{field}' is not an IP address"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_address_from_debug_output() {
        let output = r#"
PLAY [control] *****************************************************************

TASK [Print broadcast address] *************************************************
ok: [control] => {
    "msg": "192.0.2.255"
}

PLAY RECAP *********************************************************************
control                    : ok=2    changed=0    unreachable=0    failed=0
"#;
        let address = parse_broadcast_address(output).unwrap();
        assert_eq!(address.to_string(), "192.0.2.255");
    }

    #[test]
    fn missing_marker_is_an_error() {
        let result = parse_broadcast_address("PLAY RECAP\nok=1\n");
        assert!(matches!(result, Err(LifecycleError::BroadcastParse { .. })));
    }

    #[test]
    fn non_address_value_is_an_error() {
        let result = parse_broadcast_address(r#"    "msg": "VARIABLE IS NOT DEFINED!""#);
        assert!(matches!(result, Err(LifecycleError::BroadcastParse { .. })));
    }
}
