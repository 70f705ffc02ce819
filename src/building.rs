//! Graph construction.
//!
//! [`GraphBuilder::build`] turns a module set and an enabled set into a [`Graph`]:
//!
//! 1. Index the enabled modules by id and alias
//! 2. Order them so dependencies come first
//! 3. Give each module a scope whose parents are its dependencies' scopes, in
//! 	declaration order
//! 4. Give each active sub-unit either a narrow scope of its own (split mode) or
//! 	a share of its module's scope
//!
//! A module that cannot be built is reported and left out; everything else is
//! still built.

use std::collections::HashSet ;
use std::sync::{ Arc, Mutex };
use indexmap::IndexMap ;

use crate::bootstrap::ClassPathAppender ;
use crate::config::LoaderConfig ;
use crate::error::LoadError ;
use crate::graph::Graph ;
use crate::module::{ ModuleId, ModuleDescriptor };
use crate::scope::LoadingScope ;
use crate::source::SymbolSource ;
use crate::utils::PartialSuccess ;

mod active_modules ;
mod dependency_order ;
mod build_module ;

pub(crate) use active_modules::ActiveModules ;
use dependency_order::{ DependencyOrder, dependency_order };
use build_module::{ BuildContext, build_module };



/// Builds loading graphs for one host.
///
/// The builder is reusable: it holds the configuration, the bootstrap scope and
/// the symbol source shared by every scope it creates.
///
/// # Example
///
/// ```
/// use std::collections::HashSet ;
/// use scope_link::{
/// 	GraphBuilder, LoaderConfig, CoreBootstrapScope, MemorySource,
/// 	ModuleDescriptor, DependencyEdge, ModuleId,
/// };
///
/// let source = MemorySource::new()
/// 	.with_symbol( "/modules/json/lib", "org.json.Parser", b"json".as_slice() )
/// 	.with_symbol( "/modules/app/lib", "org.app.Main", b"app".as_slice() );
///
/// let core = CoreBootstrapScope::new( "core", Vec::<String>::new(), MemorySource::new() );
/// let builder = GraphBuilder::new( LoaderConfig::default(), core, source );
///
/// let modules = [
/// 	ModuleDescriptor::new( "json", "/modules/json" ).with_classpath_entry( "lib" ),
/// 	ModuleDescriptor::new( "app", "/modules/app" )
/// 		.with_classpath_entry( "lib" )
/// 		.with_dependency( DependencyEdge::required( "json" )),
/// ];
/// let enabled = modules.iter().map(| module | module.id().clone() ).collect::<HashSet<_>>();
///
/// let ( graph, errors ) = builder.build( &modules, &enabled );
/// assert!( errors.is_empty() );
///
/// let app = graph.get( &ModuleId::new( "app" )).unwrap();
/// let parser = app.resolve( "org.json.Parser" ).unwrap();
/// assert_eq!( parser.owner().module_id().as_str(), "json" );
/// ```
pub struct GraphBuilder {
	config: LoaderConfig,
	bootstrap: Arc<LoadingScope>,
	source: Arc<dyn SymbolSource>,
	legacy_host: Arc<dyn ClassPathAppender>,
	legacy_warned: Mutex<HashSet<ModuleId>>,
}

impl std::fmt::Debug for GraphBuilder {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "GraphBuilder" )
			.field( "config", &self.config )
			.field( "bootstrap", &self.bootstrap.key() )
			.finish_non_exhaustive()
	}
}

/// What a rebuild may take over from the previous graph.
#[derive( Clone, Copy )]
pub(crate) struct Reuse<'g> {
	pub previous: &'g Graph,
	/// Modules that go through the builder again; all others are copied over.
	pub rebuild: &'g HashSet<ModuleId>,
	/// Modules whose old scopes must not be reused even when unchanged in shape.
	pub fresh: &'g HashSet<ModuleId>,
}

impl GraphBuilder {

	/// Creates a builder. Legacy single-scope modules are appended to `bootstrap`.
	pub fn new( config: LoaderConfig, bootstrap: Arc<LoadingScope>, source: impl SymbolSource + 'static ) -> Self {
		Self::with_shared_source( config, bootstrap, Arc::new( source ))
	}

	/// Like [`new`]( Self::new ), sharing a source that is already boxed.
	pub fn with_shared_source( config: LoaderConfig, bootstrap: Arc<LoadingScope>, source: Arc<dyn SymbolSource> ) -> Self {
		let legacy_host: Arc<dyn ClassPathAppender> = Arc::clone( &bootstrap ) as Arc<dyn ClassPathAppender> ;
		Self { config, bootstrap, source, legacy_host, legacy_warned: Mutex::new( HashSet::new()) }
	}

	/// Routes legacy single-scope modules to a host specific loader.
	pub fn with_legacy_host( mut self, host: Arc<dyn ClassPathAppender> ) -> Self {
		self.legacy_host = host ;
		self
	}

	#[inline] pub fn config( &self ) -> &LoaderConfig { &self.config }
	#[inline] pub fn bootstrap( &self ) -> &Arc<LoadingScope> { &self.bootstrap }

	/// Builds a graph for the `enabled` subset of `modules`.
	///
	/// Deterministic: the same input always yields the same entries, parent
	/// orders and prefix lists. Safe to retry in full after a partial failure.
	///
	/// # Partial Success
	/// Every module that cannot be built is reported and left out of the graph,
	/// together with whatever depends on it. Sub-units that cannot be activated
	/// are reported without affecting their module.
	pub fn build( &self, modules: &[ModuleDescriptor], enabled: &HashSet<ModuleId> ) -> PartialSuccess<Graph, LoadError> {
		self.assemble( modules, enabled, None, 0 )
	}

	pub(crate) fn assemble(
		&self,
		modules: &[ModuleDescriptor],
		enabled: &HashSet<ModuleId>,
		reuse: Option<Reuse<'_>>,
		generation: u64,
	) -> PartialSuccess<Graph, LoadError> {

		let ( active, mut errors ) = ActiveModules::new( modules, enabled );
		let DependencyOrder { order, cycles } = dependency_order( &self.config, &active );
		let no_fresh = HashSet::with_capacity( 0 );
		let mut assigned = IndexMap::new();

		for module in order {

			let id = module.id();

			if let Some( reuse ) = reuse {
				if !reuse.rebuild.contains( id ) && reuse.previous.contains( id ) {
					assigned.extend( reuse.previous.scopes_of( id ).map(|( key, scope )| ( key.clone(), Arc::clone( scope ))));
					continue ;
				}
			}

			if let Some( dependency ) = cycles.get( id ) {
				let err = LoadError::DependencyCycle { module: id.clone(), dependency: dependency.clone() };
				tracing::error!( module = %id, error = %err, "Skipping module" );
				errors.push( err );
				continue ;
			}

			let context = BuildContext {
				config: &self.config,
				bootstrap: &self.bootstrap,
				source: &self.source,
				legacy_host: self.legacy_host.as_ref(),
				legacy_warned: &self.legacy_warned,
				active: &active,
				assigned: &assigned,
				previous: reuse.map(| reuse | reuse.previous ),
				fresh: reuse.map_or( &no_fresh, | reuse | reuse.fresh ),
			};

			match build_module( module, &context ) {
				Ok(( entries, warnings )) => {
					errors.extend( warnings );
					assigned.extend( entries );
				},
				Err(( err, warnings )) => {
					tracing::error!( module = %id, error = %err, "Skipping module" );
					errors.extend( warnings );
					errors.push( err );
				},
			}

		}

		let enabled = active.iter().map(| module | module.id().clone()).collect();
		( Graph::new( generation, Arc::clone( &self.bootstrap ), enabled, assigned ), errors )

	}

}

/// Whether `module` resolves through the bootstrap scope without a scope of its own.
pub(crate) fn is_host_scoped( config: &LoaderConfig, module: &ModuleDescriptor ) -> bool {
	module.id() == &config.core_id || module.flags().uses_host_scope_directly
}

/// The dependency the host attaches to `module`, if any.
///
/// Only applies while the umbrella marker is enabled, to modules that neither
/// depend on the target nor on any id under the opt-out prefix.
pub(crate) fn implicit_dependency<'c>(
	config: &'c LoaderConfig,
	active: &ActiveModules<'_>,
	module: &ModuleDescriptor,
) -> Option<&'c ModuleId> {
	let implicit = config.implicit_dependency.as_ref()?;
	if is_host_scoped( config, module ) || module.provides( &implicit.target ) { return None }
	if !active.contains( &implicit.marker ) || !active.contains( &implicit.target ) { return None }
	let opts_out = module.dependencies().iter()
		.filter(| edge | !edge.is_disabled_or_broken())
		.any(| edge | edge.target() == &implicit.target || implicit.opt_out_prefix.as_deref()
			.is_some_and(| prefix | edge.target().as_str().starts_with( prefix )));
	( !opts_out ).then_some( &implicit.target )
}
