// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Stack composition
//!
//! Validation, graph construction, planning, manifest rendering and output
//! resolution for a whole stack.

pub mod descriptor;
pub mod manifest;
pub mod outputs;
pub mod plan;
pub mod state;
pub mod validator;

pub use self::descriptor::{Stack, StackDescriptor};
pub use self::manifest::{Manifest, ManifestFormat};
pub use self::outputs::{OutputValue, ResolvedOutput, StackOutput, StackOutputs};
pub use self::plan::PlanStep;
pub use self::state::{ResourceState, StateSnapshot};
pub use self::validator::StackValidator;
