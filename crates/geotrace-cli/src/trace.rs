//! `geotrace trace`: run the system tracer and optionally locate each hop.

use std::collections::HashMap;
use std::net::IpAddr;

use geotrace_core::{AppConfig, StringSubject};
use geotrace_trace::{is_unroutable, PathTracer};

use crate::locate::{format_location, locate_addresses, parse_subjects, Location};

/// Hops on the way to `target`, destination last.
pub(crate) async fn trace_route(target: &str) -> anyhow::Result<Vec<IpAddr>> {
    let tracer = PathTracer::detect()?;
    tracing::debug!(tool = ?tracer.tool(), program = %tracer.program().display(), "tracer selected");
    let mut seen = 0_usize;
    let hops = tracer
        .trace(target, |hop| {
            seen += 1;
            tracing::info!(hop = seen, address = %hop, "hop");
        })
        .await?;
    Ok(hops)
}

/// Subjects for the hops worth sending to a geo-location provider.
pub(crate) fn routable_subjects(hops: &[IpAddr]) -> anyhow::Result<Vec<StringSubject>> {
    parse_subjects(hops.iter().filter(|h| !is_unroutable(**h)).map(ToString::to_string))
}

pub(crate) fn format_hop(number: usize, hop: IpAddr, location: Option<&Location>) -> String {
    if is_unroutable(hop) {
        return format!("{number:>2}  {hop}\tunroutable");
    }
    match location {
        Some(location) => format!("{number:>2}  {}", format_location(location)),
        None => format!("{number:>2}  {hop}"),
    }
}

pub(crate) async fn run_trace(config: &AppConfig, target: &str, locate: bool) -> anyhow::Result<()> {
    let hops = trace_route(target).await?;

    let mut locations: HashMap<String, Location> = HashMap::new();
    if locate {
        let subjects = routable_subjects(&hops)?;
        for location in locate_addresses(config, &subjects, true).await? {
            locations.insert(location.subject().value().to_owned(), location);
        }
    }

    for (index, hop) in hops.iter().enumerate() {
        println!("{}", format_hop(index + 1, *hop, locations.get(&hop.to_string())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn private_hops_are_not_located() {
        let hops = [ip("192.168.1.1"), ip("10.20.0.1"), ip("62.40.98.1"), ip("172.16.5.4"), ip("8.8.8.8")];
        let subjects = routable_subjects(&hops).unwrap();
        let values: Vec<&str> = subjects.iter().map(StringSubject::value).collect();
        assert_eq!(values, ["62.40.98.1", "8.8.8.8"]);
    }

    #[test]
    fn hop_lines() {
        let located = Location::new(StringSubject::new("8.8.8.8").unwrap(), 37.4, -122.1);
        assert_eq!(format_hop(1, ip("192.168.1.1"), None), " 1  192.168.1.1\tunroutable");
        assert_eq!(format_hop(2, ip("62.40.98.1"), None), " 2  62.40.98.1");
        assert_eq!(
            format_hop(12, ip("8.8.8.8"), Some(&located)),
            "12  8.8.8.8\t37.4000\t-122.1000"
        );
    }
}
