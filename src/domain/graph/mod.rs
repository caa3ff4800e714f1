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

//! Resource graph
//!
//! Immutable resource records addressed by arena index, typed properties with
//! output references, and the graph-level invariants checked before a stack is
//! rendered.

pub mod arena;
pub mod input;
pub mod resource;

pub use self::arena::ResourceGraph;
pub use self::input::{AttributeLookup, Input, OutputRef, Resolved, Transform};
pub use self::resource::{
    Resource, ResourceHandle, ResourceId, ResourceOptions, ResourceSpec, ResourceType,
};
