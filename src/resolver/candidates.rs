//! Candidate generation ladder for forward resolution.
//!
//! Each stage widens the search around the query cell. Stages are tried in
//! order until one yields at least one country.

use hashbrown::HashSet;
use tracing::debug;

use crate::error::Result;
use crate::geohash;
use crate::models::CountryId;
use crate::store::CountryData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateStage {
    /// The query cell itself (or its longest indexed prefix)
    Cell,
    /// The 8 cells around the query cell
    Neighbors,
    /// Neighbors of neighbors, minus the query cell and the first ring
    SecondRing,
    /// Every country in the store
    FullScan,
}

impl CandidateStage {
    pub const LADDER: [CandidateStage; 4] = [
        CandidateStage::Cell,
        CandidateStage::Neighbors,
        CandidateStage::SecondRing,
        CandidateStage::FullScan,
    ];

    /// Countries this stage proposes for `hash`, deduplicated in encounter order.
    pub fn collect<D: CountryData + ?Sized>(self, store: &D, hash: &str) -> Result<Vec<CountryId>> {
        let ids = match self {
            CandidateStage::Cell => store.candidate_countries(hash).to_vec(),
            CandidateStage::Neighbors => {
                let ring = geohash::neighbors(hash)?;
                union(store, ring.iter().map(String::as_str))
            }
            CandidateStage::SecondRing => {
                let cells = second_ring(hash)?;
                union(store, cells.iter().map(String::as_str))
            }
            CandidateStage::FullScan => store.all_country_ids().to_vec(),
        };
        Ok(dedup(ids))
    }
}

/// Run the ladder, returning the first stage with candidates.
///
/// When every stage comes up empty the result is `(FullScan, [])`.
pub fn gather<D: CountryData + ?Sized>(
    store: &D,
    hash: &str,
) -> Result<(CandidateStage, Vec<CountryId>)> {
    for stage in CandidateStage::LADDER {
        let ids = stage.collect(store, hash)?;
        if !ids.is_empty() {
            debug!(
                "{:?} stage for '{}' gave {} candidates",
                stage,
                hash,
                ids.len()
            );
            return Ok((stage, ids));
        }
    }
    Ok((CandidateStage::FullScan, Vec::new()))
}

/// Cells two steps away from `hash`, in encounter order.
pub fn second_ring(hash: &str) -> Result<Vec<String>> {
    let first = geohash::neighbors(hash)?;
    let mut seen: HashSet<String> = first.iter().cloned().collect();
    seen.insert(hash.to_string());

    let mut cells = Vec::new();
    for cell in &first {
        for outer in geohash::neighbors(cell)? {
            if seen.insert(outer.clone()) {
                cells.push(outer);
            }
        }
    }
    Ok(cells)
}

fn union<'a, D, I>(store: &D, cells: I) -> Vec<CountryId>
where
    D: CountryData + ?Sized,
    I: Iterator<Item = &'a str>,
{
    cells
        .flat_map(|cell| store.candidate_countries(cell).iter().copied())
        .collect()
}

fn dedup(ids: Vec<CountryId>) -> Vec<CountryId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
