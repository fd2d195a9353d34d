// Copyright 2025 The maqamat developers.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.
//
// See http://creativecommons.org/licenses/MIT/ for more information.

//! Arabic maqam analysis: tuning-system lattices, jins and maqam
//! transpositions, modulations after al-Shawwā and multi-hop modulation
//! routes.
//!
//! Data flows one way. A [`lattice::Lattice`] is built from a
//! [`catalogue::TuningSystem`]; templates are matched against it by
//! [`transpose`]; a maqam transposition feeds [`modulation`]; and [`route`]
//! searches the graph whose edges [`modulation`] produces.
//!
//! ```no_run
//! use maqamat::{build_lattice_for, maqam_transpositions, Catalogue, MatchOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let catalogue = Catalogue::from_json_file("data/catalogue.json".as_ref())?;
//! let tuning = catalogue.tuning_system("quartertone_yegah").expect("tuning system");
//! let lattice = build_lattice_for(tuning, "yegāh");
//! let rast = catalogue.maqam("maqam_rast").expect("maqam");
//! for t in maqam_transpositions(&lattice, rast, &catalogue.ajnas, &MatchOptions::default()) {
//!     println!("{}", t.name);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod catalogue;
pub mod error;
pub mod family;
pub mod interval;
pub mod lattice;
pub mod modulation;
pub mod route;
pub mod transpose;

pub use catalogue::{Catalogue, JinsTemplate, MaqamTemplate, TuningSystem};
pub use error::{CoreError, EntityKind};
pub use family::{classify_family, FamilyClassification};
pub use lattice::{build_lattice, build_lattice_for, Lattice, PitchPoint};
pub use modulation::{
    analyze_jins_modulations, analyze_maqam_modulations, analyze_modulations, ModulationCategory, ModulationSet,
    ModulationTarget,
};
pub use route::{find_routes, Endpoint, ModulationJourney, RouteOutcome, RouteRequest};
pub use transpose::{
    jins_transpositions, maqam_transpositions, match_transpositions, JinsTransposition, MaqamTransposition,
    MatchOptions, SearchStrategy,
};
