//! Link resolution.
//!
//! For every node and every link it declares, computes the transmission
//! parameters of that directed link and hands them to a
//! [`TransmissionSimulator`]. Links to unknown nodes, and links whose
//! transmitter lacks a radio parameter, are reported as
//! [`LinkResolutionFailure`]s and skipped; the pass itself never aborts.
//!
//! Enumeration order is fixed: nodes in graph order, then each node's links in
//! declaration order. Running the pass twice over the same graph issues the
//! same simulator calls in the same order.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rayon::prelude::*;

use super::graph::TopologyGraph;
use super::types::NodeRecord;
use crate::node_config::FieldKey;

/// Parameters of one simulated directed link
#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionRequest {
    pub from: String,
    pub to: String,
    pub distance_m: f64,
    pub frequency_mhz: f64,
    pub tx_power_dbm: f64,
    /// Effective data-rate label, see [`effective_rate`]
    pub rate: String,
}

/// External physical-layer simulator.
///
/// Calls may be slow. Failures belong to the simulator and are never reported
/// back to the resolver.
pub trait TransmissionSimulator {
    fn simulate_transmission(&self, request: &TransmissionRequest);
}

impl<F> TransmissionSimulator for F
where
    F: Fn(&TransmissionRequest),
{
    fn simulate_transmission(&self, request: &TransmissionRequest) {
        self(request)
    }
}

/// Simulator that only logs each link it is given
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSimulator;

impl TransmissionSimulator for LoggingSimulator {
    fn simulate_transmission(&self, request: &TransmissionRequest) {
        info!(
            "[SIM] {} -> {} | Distance: {:.3} m | Freq: {} MHz | Power: {} dBm | Rate: {}",
            request.from,
            request.to,
            request.distance_m,
            request.frequency_mhz,
            request.tx_power_dbm,
            request.rate
        );
    }
}

/// A per-link failure recorded during resolution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkResolutionFailure {
    #[error("node '{from}' links to unknown node '{to}'")]
    UnknownNodeReference { from: String, to: String },

    #[error("node '{node}' has no '{field}' value, cannot simulate its link to '{to}'")]
    MissingRadioParameter {
        node: String,
        to: String,
        field: &'static str,
    },
}

/// Pick the data-rate label used for a link.
///
/// This is the lexicographically smaller of the transmitter's and receiver's
/// labels. It is a plain string comparison, not a throughput comparison:
/// `"OfdmRate54Mbps"` sorts before `"OfdmRate6Mbps"`.
pub fn effective_rate<'a>(tx_rate: &'a str, rx_rate: &'a str) -> &'a str {
    if tx_rate < rx_rate {
        tx_rate
    } else {
        rx_rate
    }
}

/// Build the request for the link `tx -> rx`.
///
/// Fails when the transmitter has no frequency or power configured.
pub fn link_request(tx: &NodeRecord, rx: &NodeRecord) -> Result<TransmissionRequest, LinkResolutionFailure> {
    let missing = |field: FieldKey| LinkResolutionFailure::MissingRadioParameter {
        node: tx.name.clone(),
        to: rx.name.clone(),
        field: field.label(),
    };
    let frequency_mhz = tx
        .frequency_mhz
        .ok_or_else(|| missing(FieldKey::TransmissionFrequency))?;
    let tx_power_dbm = tx
        .tx_power_dbm
        .ok_or_else(|| missing(FieldKey::TransmissionPower))?;

    let rate = effective_rate(&tx.tx_rate, &rx.rx_rate);
    if tx.tx_rate != rx.rx_rate {
        debug!(
            "Link {} -> {}: effective rate '{}' chosen by string order from '{}' and '{}'",
            tx.name, rx.name, rate, tx.tx_rate, rx.rx_rate
        );
    }

    Ok(TransmissionRequest {
        from: tx.name.clone(),
        to: rx.name.clone(),
        distance_m: tx.distance_to(rx),
        frequency_mhz,
        tx_power_dbm,
        rate: rate.to_string(),
    })
}

/// Enumerate every declared link in resolution order
pub fn plan_links(graph: &TopologyGraph) -> Vec<Result<TransmissionRequest, LinkResolutionFailure>> {
    let mut plan = Vec::new();

    for tx in graph.nodes() {
        for target in &tx.links {
            match graph.node(target) {
                Some(rx) => plan.push(link_request(tx, rx)),
                None => plan.push(Err(LinkResolutionFailure::UnknownNodeReference {
                    from: tx.name.clone(),
                    to: target.clone(),
                })),
            }
        }
    }

    plan
}

/// Drives simulator calls over every link of a graph
#[derive(Debug, Clone, Default)]
pub struct LinkResolver {
    parallel: bool,
    slow_call_warning: Option<Duration>,
}

impl LinkResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue simulator calls from the rayon thread pool
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Warn when a single simulator call takes longer than `threshold`
    pub fn slow_call_warning(mut self, threshold: Option<Duration>) -> Self {
        self.slow_call_warning = threshold;
        self
    }

    /// Resolve all links and return the per-link failures in enumeration order.
    ///
    /// An empty result means every declared link was simulated. In parallel
    /// mode the simulator calls may interleave, but the returned failures are
    /// still collected in enumeration order.
    pub fn resolve<S>(&self, graph: &TopologyGraph, simulator: &S) -> Vec<LinkResolutionFailure>
    where
        S: TransmissionSimulator + Sync + ?Sized,
    {
        let plan = plan_links(graph);
        info!(
            "Resolving {} declared links across {} nodes{}",
            plan.len(),
            graph.len(),
            if self.parallel { " (parallel)" } else { "" }
        );

        let failures: Vec<LinkResolutionFailure> = if self.parallel {
            plan.into_par_iter()
                .filter_map(|entry| self.run_entry(entry, simulator))
                .collect()
        } else {
            plan.into_iter()
                .filter_map(|entry| self.run_entry(entry, simulator))
                .collect()
        };

        if failures.is_empty() {
            info!("All transmissions complete");
        } else {
            warn!("Transmissions complete with {} failed links", failures.len());
        }
        failures
    }

    fn run_entry<S>(
        &self,
        entry: Result<TransmissionRequest, LinkResolutionFailure>,
        simulator: &S,
    ) -> Option<LinkResolutionFailure>
    where
        S: TransmissionSimulator + Sync + ?Sized,
    {
        match entry {
            Ok(request) => {
                let started = Instant::now();
                simulator.simulate_transmission(&request);
                let elapsed = started.elapsed();

                if let Some(threshold) = self.slow_call_warning {
                    if elapsed > threshold {
                        warn!(
                            "Simulating {} -> {} took {:?} (threshold {:?})",
                            request.from, request.to, elapsed, threshold
                        );
                    }
                }
                None
            }
            Err(failure) => {
                warn!("Skipping link: {}", failure);
                Some(failure)
            }
        }
    }
}

/// Resolve every link sequentially with default settings
pub fn resolve_links<S>(graph: &TopologyGraph, simulator: &S) -> Vec<LinkResolutionFailure>
where
    S: TransmissionSimulator + Sync + ?Sized,
{
    LinkResolver::new().resolve(graph, simulator)
}
