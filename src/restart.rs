use itertools::Itertools ;
use nonempty_collections::NEVec ;

use crate::module::ModuleId ;
use crate::scope::ScopeKey ;



/// Raised when a reconfiguration replaced scopes that had already defined
/// symbols.
///
/// Those symbols stay bound to the old scopes, so anything holding them keeps
/// seeing the old topology until the host restarts. The graph itself is still
/// published.
#[derive( Debug, Clone )]
pub struct RestartRequest {
	scopes: NEVec<ScopeKey>,
}

impl RestartRequest {
	pub(crate) fn new( scopes: NEVec<ScopeKey> ) -> Self { Self { scopes }}

	/// The replaced entries, in the previous graph's order.
	#[inline] pub fn scopes( &self ) -> &NEVec<ScopeKey> { &self.scopes }

	/// Modules owning the replaced entries, each once.
	pub fn modules( &self ) -> impl Iterator<Item = &ModuleId> {
		self.scopes.iter().into_iter().map( ScopeKey::module_id ).unique()
	}
}

impl std::fmt::Display for RestartRequest {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		write!( f, "Restart required to replace scopes: {}", self.scopes.iter().into_iter().join( ", " ))
	}
}

/// Receives restart requests from a [`ScopeRegistry`]( crate::ScopeRegistry ).
pub trait RestartSink: Send + Sync {
	fn restart_required( &self, request: &RestartRequest );
}

impl<F: Fn( &RestartRequest ) + Send + Sync> RestartSink for F {
	fn restart_required( &self, request: &RestartRequest ) { self( request ) }
}
