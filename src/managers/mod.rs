// Bookmark sync core components
// Managers hold the synchronization state machine: session gate, snapshot loader,
// change stream, local collection and mutation gateway.

pub mod change_stream;
pub mod collection_state;
pub mod mutation_gateway;
pub mod session_gate;
pub mod snapshot_loader;
