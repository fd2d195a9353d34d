//! Modulation routes
//!
//! Every maqam transposition realizable in a lattice is a node. Its outgoing
//! edges are the maqam modulations the analyzer finds from it, computed when
//! the search first reaches the node. Routes are simple paths found by
//! breadth-first search, so they come out shortest first.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use log::{debug, info, trace};
use serde::Serialize;

use crate::catalogue::Catalogue;
use crate::error::{check_range, CoreError, EntityKind};
use crate::lattice::note_name::standardize;
use crate::lattice::{build_lattice_for, Lattice};
use crate::modulation::{maqam_modulation_edges, ModulationCategory};
use crate::transpose::{maqam_transpositions, MatchOptions, MaqamTransposition, SearchStrategy, DEFAULT_TOLERANCE_CENTS};

/// Upper bound for `max_hops`
pub const MAX_HOPS: usize = 10;

/// Journeys returned when no limit is given
pub const DEFAULT_ROUTE_LIMIT: usize = 10;

/// Upper bound for the journey limit
pub const MAX_ROUTE_LIMIT: usize = 1000;

/// A maqam at a concrete tonic
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaqamNode {
    /// Template id
    pub maqam_id: String,
    /// Display name of the transposition
    pub maqam_name: String,
    /// Standardized template id
    pub id_name: String,
    /// Standardized tonic
    pub tonic_id: String,
    /// Tonic as spelled in the lattice
    pub tonic: String,
    /// False for the tahlil
    pub is_transposition: bool,
}

impl MaqamNode {
    /// Node for a transposition
    pub fn new(transposition: &MaqamTransposition) -> Self {
        Self {
            maqam_id: transposition.maqam_id.clone(),
            maqam_name: transposition.name.clone(),
            id_name: standardize(&transposition.maqam_id),
            tonic_id: standardize(transposition.tonic()),
            tonic: transposition.tonic().to_string(),
            is_transposition: !transposition.is_tahlil(),
        }
    }

    /// Identity of the node: template and tonic
    pub fn key(&self) -> (&str, &str) {
        (&self.id_name, &self.tonic_id)
    }
}

/// One modulation along a route
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulationHop {
    /// Maqam modulated from
    pub from: MaqamNode,
    /// Maqam modulated to
    pub to: MaqamNode,
    /// Degree of `from` the modulation starts on
    pub category: ModulationCategory,
    /// Position of the hop in its route
    pub index: usize,
}

/// A chain of modulations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulationRoute {
    /// Hops in order
    pub hops: Vec<ModulationHop>,
}

impl ModulationRoute {
    /// Number of hops
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// Whether the route has no hops
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }
}

/// Outbound route, optionally with the way back
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulationJourney {
    /// Source to target
    pub outbound: ModulationRoute,
    /// Target back to source
    pub return_route: Option<ModulationRoute>,
}

impl ModulationJourney {
    /// Hops in both directions
    pub fn total_hops(&self) -> usize {
        self.outbound.len() + self.return_route.as_ref().map_or(0, ModulationRoute::len)
    }
}

/// A maqam, optionally at a given tonic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Template id or name
    pub maqam: String,
    /// Tonic; the tahlil when absent
    pub tonic: Option<String>,
}

impl Endpoint {
    /// Endpoint at `tonic`, or at the tahlil
    pub fn new(maqam: impl Into<String>, tonic: Option<&str>) -> Self {
        Self {
            maqam: maqam.into(),
            tonic: tonic.map(str::to_string),
        }
    }
}

/// Route search parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// Tuning system id
    pub tuning_system: String,
    /// Starting note of the note-name assignment
    pub starting_note: String,
    /// Where routes start
    pub source: Endpoint,
    /// Where routes end
    pub target: Endpoint,
    /// Maqamat to pass through, in order
    pub waypoints: Vec<Endpoint>,
    /// Longest outbound route, 1..=[`MAX_HOPS`]
    pub max_hops: usize,
    /// Also search the way back from target to source
    pub return_to_start: bool,
    /// Most journeys returned
    pub limit: usize,
    /// Cents tolerance for the transposition search
    pub tolerance_cents: f64,
    /// Transposition search strategy
    pub strategy: SearchStrategy,
}

impl RouteRequest {
    /// Request with default limit, tolerance and strategy, no waypoints and
    /// no return leg
    pub fn new(
        tuning_system: impl Into<String>,
        starting_note: impl Into<String>,
        source: Endpoint,
        target: Endpoint,
        max_hops: usize,
    ) -> Self {
        Self {
            tuning_system: tuning_system.into(),
            starting_note: starting_note.into(),
            source,
            target,
            waypoints: Vec::new(),
            max_hops,
            return_to_start: false,
            limit: DEFAULT_ROUTE_LIMIT,
            tolerance_cents: DEFAULT_TOLERANCE_CENTS,
            strategy: SearchStrategy::default(),
        }
    }

    fn validate(&self) -> Result<MatchOptions, CoreError> {
        check_range("max_hops", self.max_hops as f64, 1.0, MAX_HOPS as f64)?;
        check_range("limit", self.limit as f64, 1.0, MAX_ROUTE_LIMIT as f64)?;
        MatchOptions::new(self.tolerance_cents, self.strategy)
    }
}

/// Result of a route search
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "journeys", rename_all = "camelCase")]
pub enum RouteOutcome {
    /// Journeys, fewest outbound hops first
    Found(Vec<ModulationJourney>),
    /// The target is not reachable within the hop budget
    NoPath,
}

impl RouteOutcome {
    /// Journeys found; empty for [`RouteOutcome::NoPath`]
    pub fn journeys(&self) -> &[ModulationJourney] {
        match self {
            RouteOutcome::Found(journeys) => journeys,
            RouteOutcome::NoPath => &[],
        }
    }
}

/// Simple paths from `start` to `goal` of at most `max_hops` edges, fewest
/// edges first and otherwise in discovery order, at most `limit` of them.
///
/// A path is the list of (edge, node) pairs taken after `start`. The goal
/// ends a path when reached and is never expanded; `start` is only revisited
/// when it is the goal. A node is expanded at most `limit` times.
pub fn bounded_paths<N, E, F>(start: &N, goal: &N, max_hops: usize, limit: usize, mut neighbors: F) -> Vec<Vec<(E, N)>>
where
    N: Clone + Eq + Hash,
    E: Clone,
    F: FnMut(&N) -> Vec<(E, N)>,
{
    let mut found = Vec::new();
    if limit == 0 {
        return found;
    }

    let mut expansions: HashMap<N, usize> = HashMap::new();
    let mut queue: VecDeque<(N, Vec<(E, N)>)> = VecDeque::new();
    queue.push_back((start.clone(), Vec::new()));

    while let Some((node, path)) = queue.pop_front() {
        if path.len() >= max_hops {
            continue;
        }
        let count = expansions.entry(node.clone()).or_insert(0);
        if *count >= limit {
            continue;
        }
        *count += 1;

        for (edge, next) in neighbors(&node) {
            if &next == goal {
                let mut route = path.clone();
                route.push((edge, next));
                found.push(route);
                if found.len() >= limit {
                    return found;
                }
                continue;
            }
            if &next == start || path.iter().any(|(_, visited)| visited == &next) {
                continue;
            }
            let mut extended = path.clone();
            extended.push((edge, next.clone()));
            queue.push_back((next, extended));
        }
    }

    found
}

/// A route as (from, category, to) node positions
type Steps = Vec<(usize, ModulationCategory, usize)>;

/// The maqam graph of one lattice
struct Graph {
    lattice: Lattice,
    transpositions: Vec<MaqamTransposition>,
    nodes: Vec<MaqamNode>,
    /// First position with the same node key, per position
    canonical: Vec<usize>,
    edges: HashMap<usize, Vec<(ModulationCategory, usize)>>,
}

impl Graph {
    fn new(catalogue: &Catalogue, lattice: Lattice, options: &MatchOptions) -> Self {
        let transpositions: Vec<MaqamTransposition> = catalogue
            .maqamat
            .iter()
            .flat_map(|maqam| maqam_transpositions(&lattice, maqam, &catalogue.ajnas, options))
            .collect();
        let nodes: Vec<MaqamNode> = transpositions.iter().map(MaqamNode::new).collect();

        let canonical: Vec<usize> = {
            let mut first_seen: HashMap<(&str, &str), usize> = HashMap::new();
            nodes
                .iter()
                .enumerate()
                .map(|(i, node)| *first_seen.entry(node.key()).or_insert(i))
                .collect()
        };

        debug!("Modulation graph has {} nodes", nodes.len());
        Self {
            lattice,
            transpositions,
            nodes,
            canonical,
            edges: HashMap::new(),
        }
    }

    fn resolve(&self, catalogue: &Catalogue, endpoint: &Endpoint) -> Result<usize, CoreError> {
        let template = catalogue
            .maqam(&endpoint.maqam)
            .ok_or_else(|| CoreError::not_found(EntityKind::Template, endpoint.maqam.as_str()))?;

        let mut positions = (0..self.nodes.len()).filter(|&i| self.nodes[i].maqam_id == template.id);
        let first = positions
            .clone()
            .next()
            .ok_or_else(|| CoreError::not_found(EntityKind::Template, endpoint.maqam.as_str()))?;

        let Some(tonic) = &endpoint.tonic else {
            return Ok(positions.find(|&i| !self.nodes[i].is_transposition).unwrap_or(first));
        };
        let wanted = standardize(tonic);
        positions
            .find(|&i| self.nodes[i].tonic_id == wanted)
            .ok_or_else(|| CoreError::not_found(EntityKind::Tonic, format!("{} / {}", endpoint.maqam, tonic)))
    }

    fn neighbors(&mut self, node: usize) -> Vec<(ModulationCategory, usize)> {
        if let Some(edges) = self.edges.get(&node) {
            return edges.clone();
        }
        let edges: Vec<(ModulationCategory, usize)> =
            maqam_modulation_edges(&self.transpositions[node], &self.lattice, &self.transpositions)
                .into_iter()
                .map(|(category, position)| (category, self.canonical[position]))
                .collect();
        trace!("{} modulations from '{}'", edges.len(), self.nodes[node].maqam_name);
        self.edges.insert(node, edges.clone());
        edges
    }

    fn paths(&mut self, from: usize, to: usize, max_hops: usize, limit: usize) -> Vec<Steps> {
        bounded_paths(&from, &to, max_hops, limit, |&node| self.neighbors(node))
            .into_iter()
            .map(|path| {
                let mut previous = from;
                path.into_iter()
                    .map(|(category, next)| {
                        let step = (previous, category, next);
                        previous = next;
                        step
                    })
                    .collect()
            })
            .collect()
    }

    fn route(&self, steps: &[(usize, ModulationCategory, usize)]) -> ModulationRoute {
        let hops = steps
            .iter()
            .enumerate()
            .map(|(index, &(from, category, to))| ModulationHop {
                from: self.nodes[from].clone(),
                to: self.nodes[to].clone(),
                category,
                index,
            })
            .collect();
        ModulationRoute { hops }
    }
}

/// Join per-segment routes in order, keeping totals within `max_hops`,
/// fewest hops first (stable), at most `limit`.
fn combine_segments(segments: Vec<Vec<Steps>>, max_hops: usize, limit: usize) -> Vec<Steps> {
    let mut combined: Vec<Steps> = vec![Vec::new()];
    for segment in segments {
        let mut next = Vec::new();
        for head in &combined {
            for tail in &segment {
                if head.len() + tail.len() <= max_hops {
                    next.push(head.iter().chain(tail).copied().collect::<Steps>());
                }
            }
        }
        next.sort_by_key(Vec::len);
        next.truncate(limit);
        combined = next;
    }
    combined
}

/// Find journeys from `request.source` to `request.target` through the
/// waypoints in order.
///
/// Parameters are validated before anything else. Unknown tuning systems,
/// starting notes, templates and tonics are [`CoreError::NotFound`]; a
/// template that cannot be realized in the lattice counts as unknown. A
/// target out of reach is [`RouteOutcome::NoPath`].
pub fn find_routes(catalogue: &Catalogue, request: &RouteRequest) -> Result<RouteOutcome, CoreError> {
    let options = request.validate()?;

    let tuning_system = catalogue
        .tuning_system(&request.tuning_system)
        .ok_or_else(|| CoreError::not_found(EntityKind::TuningSystem, request.tuning_system.as_str()))?;
    if tuning_system.note_names_for(&request.starting_note).is_none() {
        return Err(CoreError::not_found(EntityKind::StartingNote, request.starting_note.as_str()));
    }

    let lattice = build_lattice_for(tuning_system, &request.starting_note);
    let mut graph = Graph::new(catalogue, lattice, &options);

    let source = graph.resolve(catalogue, &request.source)?;
    let target = graph.resolve(catalogue, &request.target)?;
    let mut stops = vec![source];
    for waypoint in &request.waypoints {
        stops.push(graph.resolve(catalogue, waypoint)?);
    }
    stops.push(target);

    // every segment needs at least one hop
    let segment_count = stops.len() - 1;
    let Some(segment_budget) = (request.max_hops + 1).checked_sub(segment_count) else {
        info!("{} segments cannot fit in {} hops", segment_count, request.max_hops);
        return Ok(RouteOutcome::NoPath);
    };

    let mut segments = Vec::with_capacity(segment_count);
    for pair in stops.windows(2) {
        let paths = graph.paths(pair[0], pair[1], segment_budget, request.limit);
        if paths.is_empty() {
            info!(
                "No route from '{}' to '{}' within {} hops",
                graph.nodes[pair[0]].maqam_name, graph.nodes[pair[1]].maqam_name, segment_budget
            );
            return Ok(RouteOutcome::NoPath);
        }
        segments.push(paths);
    }

    let outbound = combine_segments(segments, request.max_hops, request.limit);
    if outbound.is_empty() {
        return Ok(RouteOutcome::NoPath);
    }

    let return_route = if request.return_to_start {
        graph
            .paths(target, source, request.max_hops, 1)
            .first()
            .map(|steps| graph.route(steps))
    } else {
        None
    };

    let journeys: Vec<ModulationJourney> = outbound
        .iter()
        .map(|steps| ModulationJourney {
            outbound: graph.route(steps),
            return_route: return_route.clone(),
        })
        .collect();

    info!(
        "Found {} journeys from '{}' to '{}' ({} nodes expanded)",
        journeys.len(),
        graph.nodes[source].maqam_name,
        graph.nodes[target].maqam_name,
        graph.edges.len()
    );
    Ok(RouteOutcome::Found(journeys))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(u32, u32)]) -> impl FnMut(&u32) -> Vec<((), u32)> + '_ {
        move |&node| {
            edges
                .iter()
                .filter(|(from, _)| *from == node)
                .map(|&(_, to)| ((), to))
                .collect()
        }
    }

    fn nodes(path: &[((), u32)]) -> Vec<u32> {
        path.iter().map(|(_, n)| *n).collect()
    }

    #[test]
    fn test_shortest_first() {
        let edges = [(0, 1), (1, 2), (2, 3), (0, 3)];
        let paths = bounded_paths(&0, &3, 5, 10, graph(&edges));
        assert_eq!(paths.len(), 2);
        assert_eq!(nodes(&paths[0]), [3]);
        assert_eq!(nodes(&paths[1]), [1, 2, 3]);
    }

    #[test]
    fn test_max_hops_bound() {
        let edges = [(0, 1), (1, 2), (2, 3)];
        assert!(bounded_paths(&0, &3, 2, 10, graph(&edges)).is_empty());
        assert_eq!(bounded_paths(&0, &3, 3, 10, graph(&edges)).len(), 1);
    }

    #[test]
    fn test_limit() {
        let edges = [(0, 1), (0, 2), (0, 3), (1, 4), (2, 4), (3, 4)];
        let paths = bounded_paths(&0, &4, 5, 2, graph(&edges));
        assert_eq!(paths.len(), 2);
        assert_eq!(nodes(&paths[0]), [1, 4]);
        assert_eq!(nodes(&paths[1]), [2, 4]);
    }

    #[test]
    fn test_cycles_are_skipped() {
        let edges = [(0, 1), (1, 0), (1, 2), (2, 1), (2, 3)];
        let paths = bounded_paths(&0, &3, 10, 10, graph(&edges));
        assert_eq!(paths.len(), 1);
        assert_eq!(nodes(&paths[0]), [1, 2, 3]);
    }

    #[test]
    fn test_start_as_goal_needs_a_cycle() {
        assert!(bounded_paths(&0, &0, 3, 10, graph(&[(0, 1), (1, 2)])).is_empty());

        let paths = bounded_paths(&0, &0, 3, 10, graph(&[(0, 1), (1, 0)]));
        assert_eq!(paths.len(), 1);
        assert_eq!(nodes(&paths[0]), [1, 0]);
    }

    #[test]
    fn test_growing_max_hops_keeps_routes() {
        let edges = [(0, 1), (1, 4), (0, 2), (2, 3), (3, 4), (1, 2), (2, 4)];
        let mut previous: Vec<Vec<u32>> = Vec::new();
        for max_hops in 1..=5 {
            let paths: Vec<Vec<u32>> = bounded_paths(&0, &4, max_hops, 10, graph(&edges))
                .iter()
                .map(|p| nodes(p))
                .collect();
            assert!(paths.iter().all(|p| p.len() <= max_hops));
            assert_eq!(&paths[..previous.len()], &previous[..]);
            previous = paths;
        }
        assert_eq!(previous.len(), 5);
    }

    #[test]
    fn test_combine_segments() {
        let c = ModulationCategory::FirstDegree;
        let first = vec![vec![(0, c, 1)], vec![(0, c, 2), (2, c, 1)]];
        let second = vec![vec![(1, c, 3)], vec![(1, c, 4), (4, c, 3)]];

        let combined = combine_segments(vec![first.clone(), second.clone()], 3, 10);
        assert_eq!(combined.iter().map(Vec::len).collect::<Vec<_>>(), [2, 3, 3]);
        assert_eq!(combined[0], [(0, c, 1), (1, c, 3)]);
        assert_eq!(combined[1], [(0, c, 1), (1, c, 4), (4, c, 3)]);

        assert_eq!(combine_segments(vec![first, second], 4, 1).len(), 1);
    }

    #[test]
    fn test_request_validation() {
        let request = |max_hops| RouteRequest::new("t", "yegāh", Endpoint::new("a", None), Endpoint::new("b", None), max_hops);
        let catalogue = Catalogue::default();

        for bad in [0, MAX_HOPS + 1] {
            assert!(matches!(
                find_routes(&catalogue, &request(bad)),
                Err(CoreError::ParameterRange { name: "max_hops", .. })
            ));
        }

        let mut wide = request(3);
        wide.tolerance_cents = 60.0;
        assert!(matches!(find_routes(&catalogue, &wide), Err(CoreError::ParameterRange { name: "tolerance", .. })));

        let mut unlimited = request(3);
        unlimited.limit = 0;
        assert!(matches!(find_routes(&catalogue, &unlimited), Err(CoreError::ParameterRange { name: "limit", .. })));

        assert!(matches!(
            find_routes(&catalogue, &request(3)),
            Err(CoreError::NotFound { kind: EntityKind::TuningSystem, .. })
        ));
    }

    #[test]
    fn test_journey_hops() {
        let journey = ModulationJourney {
            outbound: ModulationRoute::default(),
            return_route: None,
        };
        assert_eq!(journey.total_hops(), 0);
        assert_eq!(RouteOutcome::NoPath.journeys().len(), 0);
    }
}
