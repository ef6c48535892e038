//! Population and children buffers
//!
//! `Population` holds the live generation in `[0, size)` and uses the slots
//! beyond `size` as scratch space while children are merged in. `Brood`
//! collects the offspring of a single generation.

use crate::error::{EvoResult, GenomeError};
use crate::fitness::traits::FitnessValue;
use crate::population::chromosome::{Chromosome, Gene};

/// Stable fittest-first sort
///
/// Undecoded chromosomes sink below every decoded one, and fitness values
/// that cannot be ordered sink below every comparable one.
pub fn sort_fittest_first<G: Gene, F: FitnessValue>(chromosomes: &mut [Chromosome<G, F>]) {
    chromosomes.sort_by(|a, b| match (a.fitness(), b.fitness()) {
        (Some(fa), Some(fb)) => fa.rank(fb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Check that a slice is ordered fittest-first
pub fn is_fittest_first<G: Gene, F: FitnessValue>(chromosomes: &[Chromosome<G, F>]) -> bool {
    chromosomes
        .windows(2)
        .all(|pair| !pair[1].is_better_than(&pair[0]))
}

/// The live generation plus its replacement scratch region
#[derive(Clone, Debug)]
pub struct Population<G, F = f64> {
    members: Vec<Chromosome<G, F>>,
    size: usize,
}

impl<G: Gene, F: FitnessValue> Population<G, F> {
    /// Create an empty population for `size` live members and
    /// `scratch` transient slots
    pub fn with_capacity(size: usize, scratch: usize) -> Self {
        Self {
            members: Vec::with_capacity(size + scratch),
            size,
        }
    }

    /// Create a population whose live region is exactly `members`
    pub fn from_members(members: Vec<Chromosome<G, F>>) -> Self {
        let size = members.len();
        Self { members, size }
    }

    /// Configured number of live members
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of occupied slots, including the extended region
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check if the live region is fully populated
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.size
    }

    /// The live region
    pub fn live(&self) -> &[Chromosome<G, F>] {
        let end = self.size.min(self.members.len());
        &self.members[..end]
    }

    /// Every occupied slot
    pub fn members(&self) -> &[Chromosome<G, F>] {
        &self.members
    }

    /// Mutable access to every occupied slot
    pub fn members_mut(&mut self) -> &mut [Chromosome<G, F>] {
        &mut self.members
    }

    /// The fittest live member, once ordered
    pub fn fittest(&self) -> Option<&Chromosome<G, F>> {
        self.live().first()
    }

    /// The least fit live member, once ordered
    pub fn weakest(&self) -> Option<&Chromosome<G, F>> {
        self.live().last()
    }

    /// Append a chromosome to the next free slot
    pub fn push(&mut self, chromosome: Chromosome<G, F>) {
        self.members.push(chromosome);
    }

    /// Check if any occupied slot holds a chromosome with the same genes
    pub fn contains_equal(&self, candidate: &Chromosome<G, F>) -> bool {
        self.members.iter().any(|m| m.is_equal(candidate))
    }

    /// Sort the live region fittest-first
    pub fn order_live(&mut self) {
        let end = self.size.min(self.members.len());
        sort_fittest_first(&mut self.members[..end]);
    }

    /// Sort every occupied slot fittest-first
    pub fn order_extended(&mut self) {
        sort_fittest_first(&mut self.members);
    }

    /// Drop the extended region, keeping the live members
    pub fn truncate_to_live(&mut self) {
        self.members.truncate(self.size);
    }

    /// Deep copy of the live region through `try_clone`
    pub fn try_clone_live(&self) -> Result<Self, GenomeError> {
        let mut members = Vec::new();
        members
            .try_reserve_exact(self.members.capacity().max(self.size))
            .map_err(|e| GenomeError::CloneFailure(e.to_string()))?;
        for member in self.live() {
            members.push(member.try_clone()?);
        }
        Ok(Self {
            members,
            size: self.size,
        })
    }

    /// Check that no two live members share genes
    pub fn has_unique_live_members(&self) -> bool {
        let live = self.live();
        live.iter()
            .enumerate()
            .all(|(i, a)| live[i + 1..].iter().all(|b| !a.is_equal(b)))
    }
}

impl<G, F> std::ops::Index<usize> for Population<G, F> {
    type Output = Chromosome<G, F>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.members[index]
    }
}

/// Offspring buffer for a single generation
///
/// Slots are written through an explicit cursor: a write may replace an
/// occupied slot or append at the cursor, never skip past it.
#[derive(Clone, Debug)]
pub struct Brood<G, F = f64> {
    slots: Vec<Chromosome<G, F>>,
}

impl<G: Gene, F: FitnessValue> Brood<G, F> {
    /// Create an empty brood
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Logically empty the buffer for a new generation
    pub fn reset(&mut self) {
        self.slots.clear();
    }

    /// Number of children held
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no children are held
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Write a child at `index`, which must not lie past the cursor
    pub fn place(&mut self, index: usize, child: Chromosome<G, F>) -> EvoResult<()> {
        let length = self.slots.len();
        if index < length {
            self.slots[index] = child;
        } else if index == length {
            self.slots.push(child);
        } else {
            return Err(GenomeError::IndexOutOfRange { index, length }.into());
        }
        Ok(())
    }

    /// Append a child at the cursor
    pub fn push(&mut self, child: Chromosome<G, F>) {
        self.slots.push(child);
    }

    /// Get a child by index
    pub fn get(&self, index: usize) -> Option<&Chromosome<G, F>> {
        self.slots.get(index)
    }

    /// The children held
    pub fn children(&self) -> &[Chromosome<G, F>] {
        &self.slots
    }

    /// Mutable access to the children held
    pub fn children_mut(&mut self) -> &mut [Chromosome<G, F>] {
        &mut self.slots
    }

    /// Keep only the children whose index satisfies `keep`
    pub fn retain_indices(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let mut index = 0;
        self.slots.retain(|_| {
            let kept = keep(index);
            index += 1;
            kept
        });
    }

    /// Move every child out, leaving the brood empty
    pub fn drain(&mut self) -> std::vec::Drain<'_, Chromosome<G, F>> {
        self.slots.drain(..)
    }
}
