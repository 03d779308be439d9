//! Proptest strategies for economy testing.
//!
//! Commands are drawn from ids that exist in the standard catalog, so any
//! generated sequence can be fed straight to [`Simulation::execute`].
//!
//! [`Simulation::execute`]: bastion_core::simulation::Simulation::execute

use bastion_core::catalog::Catalog;
use bastion_core::resources::ResourceKind;
use bastion_core::simulation::Command;
use proptest::prelude::*;
use proptest::sample::select;

/// One step of a generated game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Advance both clocks this many seconds.
    Wait(u32),
    /// Apply a command.
    Command(Command),
}

/// Any resource kind.
pub fn arb_resource() -> impl Strategy<Value = ResourceKind> {
    select(ResourceKind::ALL.to_vec())
}

/// An infusion slot, occasionally empty.
pub fn arb_slot() -> impl Strategy<Value = Option<ResourceKind>> {
    prop_oneof![
        1 => Just(None),
        6 => arb_resource().prop_map(Some),
    ]
}

/// A command referencing only ids from the standard catalog.
pub fn arb_command() -> impl Strategy<Value = Command> {
    let catalog = Catalog::standard();
    let regions: Vec<_> = catalog.regions.iter().map(|r| r.id.clone()).collect();
    let pois: Vec<_> = catalog.pois.iter().map(|p| p.id.clone()).collect();
    let recipes: Vec<_> = catalog.recipes.iter().map(|r| r.id.clone()).collect();

    prop_oneof![
        1 => select(regions).prop_map(|region| Command::Travel { region }),
        1 => select(pois).prop_map(|poi| Command::Conquer { poi }),
        3 => select(recipes.clone()).prop_map(|recipe| Command::Enqueue { recipe }),
        1 => (0usize..6).prop_map(|index| Command::CancelQueued { index }),
        1 => select(recipes).prop_map(|recipe| Command::Upgrade { recipe }),
        1 => (arb_slot(), arb_slot()).prop_map(|(primary, secondary)| Command::Infuse {
            primary,
            secondary
        }),
        1 => Just(Command::LevelUp { hero: "h1".into() }),
        1 => Just(Command::Prestige),
    ]
}

/// A wait or a command.
pub fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (1u32..120).prop_map(Action::Wait),
        arb_command().prop_map(Action::Command),
    ]
}

/// A sequence of actions.
pub fn arb_action_sequence(max_len: usize) -> impl Strategy<Value = Vec<Action>> {
    proptest::collection::vec(arb_action(), 0..max_len)
}

/// A starting balance for one resource.
pub fn arb_balance() -> impl Strategy<Value = i32> {
    0i32..20_000
}
