//! Route configuration builder.
//!
//! # Data Flow
//! ```text
//! container snapshot
//!     → labels.rs (eligibility, hostnames, port, headers)
//!     → group_by_hostname (one Route per primary hostname)
//!     → render (sorted text document)
//! ```
//!
//! # Design Decisions
//! - Stateless: the whole document is rebuilt on every change
//! - Output is byte-identical for identical input
//! - Malformed labels exclude or are ignored, never error

pub mod labels;
pub mod types;

use std::collections::BTreeMap;

pub use types::{Container, Port, Route, Upstream};

use labels::{parse_headers, parse_port, parse_vhosts, should_proxy, LABEL_VHOST};

/// Generate a route configuration document from a container snapshot.
///
/// `route_extras` is inserted, line by line, into every route block.
pub fn build(containers: &[Container], route_extras: &str) -> String {
    let routes = group_by_hostname(containers);
    render(routes.values(), route_extras)
}

/// Group eligible containers into routes keyed by primary hostname.
///
/// The first container seen for a hostname fixes its alternatives; every
/// eligible container adds an upstream and merges its headers over the
/// existing ones.
pub fn group_by_hostname(containers: &[Container]) -> BTreeMap<String, Route> {
    let mut routes: BTreeMap<String, Route> = BTreeMap::new();

    for container in containers {
        if !should_proxy(container) {
            continue;
        }
        let vhost = container.label(LABEL_VHOST).unwrap_or_default();
        let (Some((primary, alternatives)), Some(port)) = (parse_vhosts(vhost), parse_port(container))
        else {
            continue;
        };

        let route = routes
            .entry(primary.clone())
            .or_insert_with(|| Route::new(primary, alternatives));

        route.upstreams.push(Upstream {
            name: container.name.clone(),
            port,
        });
        route.headers.extend(parse_headers(container));
    }

    routes
}

/// Render routes in iteration order.
pub fn render<'a>(routes: impl IntoIterator<Item = &'a Route>, route_extras: &str) -> String {
    let extras: Vec<&str> = route_extras
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut out = String::new();
    for route in routes {
        write_route(&mut out, route, &extras);
    }
    out
}

fn write_route(out: &mut String, route: &Route, extras: &[&str]) {
    out.push_str("route ");
    out.push_str(&route.primary);
    for alt in &route.alternatives {
        out.push(' ');
        out.push_str(alt);
    }
    out.push('\n');

    for upstream in &route.upstreams {
        out.push_str(&format!("    upstream {}:{}\n", upstream.name, upstream.port));
    }

    for line in extras {
        out.push_str(&format!("    {line}\n"));
    }

    for (name, value) in &route.headers {
        out.push_str(&format!("    header replace {name} {value}\n"));
    }

    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::labels::{LABEL_PROXY, LABEL_VHOST};

    fn web(name: &str, vhost: &str, port: &str) -> Container {
        Container::new(name)
            .with_label(LABEL_VHOST, vhost)
            .with_label(LABEL_PROXY, port)
    }

    #[test]
    fn single_route_example() {
        let containers = vec![web("web1", "example.com, www.example.com", "8080")];
        assert_eq!(
            build(&containers, ""),
            "route example.com www.example.com\n    upstream web1:8080\n\n"
        );
    }

    #[test]
    fn empty_snapshot_renders_nothing() {
        assert_eq!(build(&[], "tls auto"), "");
    }

    #[test]
    fn routes_sorted_by_primary() {
        let containers = vec![
            web("c", "zeta.com", "1"),
            web("a", "alpha.com", "2"),
            web("b", "mid.com", "3"),
        ];
        let out = build(&containers, "");
        let primaries: Vec<&str> = out
            .lines()
            .filter_map(|line| line.strip_prefix("route "))
            .collect();
        assert_eq!(primaries, vec!["alpha.com", "mid.com", "zeta.com"]);
    }

    #[test]
    fn grouping_keeps_first_alternatives_and_last_header() {
        let first = web("one", "app.com first.app.com", "80")
            .with_label("com.chameth.headers.a", "X-Frame: DENY");
        let second = web("two", "app.com second.app.com", "81")
            .with_label("com.chameth.headers.b", "X-Frame: SAMEORIGIN")
            .with_label("com.chameth.headers.c", "A-Header: 1");

        let out = build(&[first, second], "");
        assert_eq!(
            out,
            "route app.com first.app.com\n\
             \x20   upstream one:80\n\
             \x20   upstream two:81\n\
             \x20   header replace A-Header 1\n\
             \x20   header replace X-Frame SAMEORIGIN\n\n"
        );
    }

    #[test]
    fn label_port_rendered_verbatim() {
        let containers = vec![
            web("neg", "neg.com", "-80"),
            web("wide", "wide.com", "4294967296"),
        ];
        assert_eq!(
            build(&containers, ""),
            "route neg.com\n    upstream neg:-80\n\n\
             route wide.com\n    upstream wide:4294967296\n\n"
        );
    }

    #[test]
    fn duplicate_upstreams_are_kept() {
        let out = build(&[web("a", "x.com", "80"), web("a", "x.com", "80")], "");
        assert_eq!(out.matches("upstream a:80").count(), 2);
    }

    #[test]
    fn extras_trimmed_and_blank_lines_dropped() {
        let out = build(&[web("a", "x.com", "80")], "  tls auto \n\n\tcompress\n");
        assert_eq!(
            out,
            "route x.com\n    upstream a:80\n    tls auto\n    compress\n\n"
        );
    }

    #[test]
    fn ineligible_containers_are_excluded() {
        let containers = vec![
            Container::new("nolabel").with_port(80, 0),
            Container::new("empty").with_label(LABEL_VHOST, "").with_port(80, 0),
            Container::new("two-ports")
                .with_label(LABEL_VHOST, "two.com")
                .with_port(80, 0)
                .with_port(81, 0),
            Container::new("blank-hosts")
                .with_label(LABEL_VHOST, " , ")
                .with_port(80, 0),
        ];
        assert_eq!(build(&containers, ""), "");
    }

    #[test]
    fn build_is_deterministic() {
        let containers = vec![
            web("b", "b.com", "80").with_label("com.chameth.headers.z", "Z: 1"),
            web("a", "a.com a2.com", "81").with_label("com.chameth.headers.y", "Y: 2"),
        ];
        assert_eq!(build(&containers, "x\ny"), build(&containers, "x\ny"));
    }
}
