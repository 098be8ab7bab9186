use std::io::Write;

use gridnode::types::{Host, HostId, HostPath};
use serde_json::json;
use tempfile::NamedTempFile;

pub(crate) fn host(address: &str, port: u16, id: &str, path: &str) -> Host {
    Host::new(address, port, HostId::new(id), HostPath::new(path))
}

/// Write a routing view file declaring `localhost` and `hosts`.
pub(crate) fn routing_view_file(localhost: &Host, hosts: &[Host]) -> NamedTempFile {
    write_json(&json!({ "localhost": localhost, "hosts": hosts }))
}

/// Write a network membership file listing `hosts`.
pub(crate) fn membership_file(hosts: &[Host]) -> NamedTempFile {
    write_json(&json!(hosts))
}

pub(crate) fn write_json(value: &serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(value.to_string().as_bytes()).unwrap();
    file
}
