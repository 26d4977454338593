//! GM personality: archetypes and the modifiers they apply to decisions.

pub mod archetype;
pub mod modifiers;

pub use archetype::{GMArchetype, GMTraits};
pub use modifiers::{DecisionContext, DecisionInputs, PersonalityModifiers, PlayerProfile};
