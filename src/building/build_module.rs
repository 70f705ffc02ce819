use std::collections::HashSet ;
use std::path::PathBuf ;
use std::sync::{ Arc, Mutex, PoisonError };
use indexmap::IndexMap ;
use pipe_trait::Pipe ;

use crate::bootstrap::ClassPathAppender ;
use crate::classpath::normalise_classpath ;
use crate::config::LoaderConfig ;
use crate::error::LoadError ;
use crate::graph::Graph ;
use crate::module::{ ModuleId, ModuleDescriptor, DependencyEdge };
use crate::prefix::collect_prefixes ;
use crate::scope::{ LoadingScope, ScopeKey, ScopeKind, ScopeId, Visibility };
use crate::source::SymbolSource ;
use crate::utils::PartialResult ;
use super::{ ActiveModules, implicit_dependency, is_host_scoped };



type Entries = Vec<( ScopeKey, Arc<LoadingScope> )>;

/// Everything a single module build reads.
pub(crate) struct BuildContext<'a, 'b> {
	pub config: &'b LoaderConfig,
	pub bootstrap: &'b Arc<LoadingScope>,
	pub source: &'b Arc<dyn SymbolSource>,
	pub legacy_host: &'b dyn ClassPathAppender,
	pub legacy_warned: &'b Mutex<HashSet<ModuleId>>,
	pub active: &'b ActiveModules<'a>,
	/// Entries of the modules built so far.
	pub assigned: &'b IndexMap<ScopeKey, Arc<LoadingScope>>,
	pub previous: Option<&'b Graph>,
	pub fresh: &'b HashSet<ModuleId>,
}

impl BuildContext<'_, '_> {

	/// The module scope of whatever answers to `target`.
	fn dependency_scope( &self, dependent: &ScopeKey, target: &ModuleId ) -> Result<Arc<LoadingScope>, LoadError> {
		self.active.resolve( target )
			.and_then(| dependency | self.assigned.get( &ScopeKey::module( dependency.id().clone() )))
			.map( Arc::clone )
			.ok_or_else(|| LoadError::MissingDependencyScope { scope: dependent.clone(), dependency: target.clone() })
	}

	/// The previous graph's scope for `key` when nothing about it changed,
	/// otherwise a new one.
	fn scope(
		&self,
		key: ScopeKey,
		kind: ScopeKind,
		classpath: &Arc<[PathBuf]>,
		parents: Vec<Arc<LoadingScope>>,
		visibility: Visibility,
	) -> Arc<LoadingScope> {

		let reusable = self.previous
			.filter(| _ | !self.fresh.contains( key.module_id()))
			.and_then(| previous | previous.get_scope( &key ))
			.filter(| old | old.kind() == kind && old.has_shape( &parents, &visibility, classpath ));

		if let Some( old ) = reusable {
			tracing::debug!( scope = %key, id = %old.id(), "Reusing loading scope" );
			return Arc::clone( old );
		}

		let scope = LoadingScope::new(
			key,
			kind,
			Arc::clone( classpath ),
			parents,
			visibility,
			Some( Arc::clone( self.bootstrap )),
			Arc::clone( self.source ),
		).pipe( Arc::new );

		tracing::debug!(
			scope = %scope.key(),
			id = %scope.id(),
			parents = ?scope.parent_keys().collect::<Vec<_>>(),
			prefixes = ?scope.allowed_prefixes(),
			"Created loading scope",
		);
		scope

	}

	fn warn_legacy_once( &self, module: &ModuleId ) {
		let first = self.legacy_warned.lock().unwrap_or_else( PoisonError::into_inner ).insert( module.clone());
		if first {
			tracing::warn!( module = %module, "Module is loaded by the host loader; isolation is deprecated for it" );
		}
	}

}

/// Parent list under construction: duplicate free, bootstrap excluded.
struct ParentScopes {
	bootstrap: ScopeId,
	scopes: IndexMap<ScopeId, Arc<LoadingScope>>,
}

impl ParentScopes {
	fn new( bootstrap: &LoadingScope ) -> Self {
		Self { bootstrap: bootstrap.id(), scopes: IndexMap::new() }
	}

	fn add( &mut self, scope: Arc<LoadingScope> ) {
		if scope.id() != self.bootstrap { self.scopes.entry( scope.id()).or_insert( scope ); }
	}

	fn into_vec( self ) -> Vec<Arc<LoadingScope>> { self.scopes.into_values().collect() }
}

/// Builds the entries of one module: its own scope and one entry per active sub-unit.
///
/// # Partial Success
/// Sub-units that cannot be activated are reported next to the entries that were
/// built. An error only comes back when the module itself cannot be built.
pub(crate) fn build_module( module: &ModuleDescriptor, context: &BuildContext<'_, '_> ) -> PartialResult<Entries, LoadError> {

	let key = ScopeKey::module( module.id().clone());

	if is_host_scoped( context.config, module ) {
		let mut entries = vec![( key.clone(), Arc::clone( context.bootstrap ))];
		share_with_sub_units( module.dependencies(), &key, context.bootstrap, context, &mut entries );
		return Ok(( entries, Vec::new() ));
	}

	let classpath = normalise_classpath( module ).map_err(| entry | (
		LoadError::MalformedClasspathEntry { module: module.id().clone(), entry },
		Vec::new(),
	))?;

	let legacy = module.flags().uses_legacy_single_scope ;
	let split = !legacy && context.config.split.allows( module.id());
	let mut warnings = Vec::new();
	let mut parents = ParentScopes::new( context.bootstrap );
	let mut collapsed = Vec::new();

	// Ordering drops the implicit edge when its target requires this module.
	// The module is then built without it.
	if let Some( target ) = implicit_dependency( context.config, context.active, module ) {
		match context.dependency_scope( &key, target ) {
			Ok( scope ) => parents.add( scope ),
			Err( _ ) => {
				tracing::warn!( module = %module.id(), dependency = %target, "Building module without its implicit dependency" );
				warnings.push( LoadError::ImplicitDependencyUnavailable { module: module.id().clone(), dependency: target.clone() });
			},
		}
	}

	for edge in module.dependencies() {
		if edge.is_disabled_or_broken() { continue }
		match edge.sub_unit() {
			None if edge.is_optional() => {},
			None => match context.dependency_scope( &key, edge.target()) {
				Ok( scope ) => parents.add( scope ),
				Err( err ) => return Err(( err, warnings )),
			},
			Some( _ ) if split => if edge.is_hard() {
				if let Err( err ) = context.dependency_scope( &key, edge.target()) { return Err(( err, warnings )) }
			},
			Some( _ ) => if let Err( err ) = collapse_sub_unit( edge, &key, context, &mut parents, &mut collapsed, &mut warnings ) {
				return Err(( err, warnings ));
			},
		}
	}

	if legacy {
		context.warn_legacy_once( module.id());
		for entry in classpath.iter() {
			if let Err( source ) = context.legacy_host.append_classpath_entry( entry ) {
				return Err(( LoadError::LegacyClasspathRejected { module: module.id().clone(), source }, warnings ));
			}
		}
		let mut entries = vec![( key.clone(), Arc::clone( context.bootstrap ))];
		entries.extend( collapsed.into_iter().map(| sub_unit | ( sub_unit, Arc::clone( context.bootstrap ))));
		return Ok(( entries, warnings ));
	}

	let scope = context.scope( key.clone(), ScopeKind::Module, &classpath, parents.into_vec(), Visibility::Unrestricted );
	let mut entries = vec![( key.clone(), Arc::clone( &scope ))];

	match split {
		true => module.dependencies().iter().for_each(| edge |
			configure_sub_unit( edge, &key, &scope, &classpath, context, &mut entries, &mut warnings )),
		false => entries.extend( collapsed.into_iter().map(| sub_unit | ( sub_unit, Arc::clone( &scope )))),
	}

	Ok(( entries, warnings ))

}

/// Maps every active sub-unit below `host` onto `scope`.
fn share_with_sub_units(
	edges: &[DependencyEdge],
	host: &ScopeKey,
	scope: &Arc<LoadingScope>,
	context: &BuildContext<'_, '_>,
	entries: &mut Entries,
) {
	for edge in edges {
		if edge.is_disabled_or_broken() || !context.active.contains( edge.target()) { continue }
		let Some( sub_unit ) = edge.sub_unit() else { continue };
		let key = host.sub_unit( edge.target().clone());
		entries.push(( key.clone(), Arc::clone( scope )));
		share_with_sub_units( sub_unit.dependencies(), &key, scope, context, entries );
	}
}

/// Folds a sub-unit into its module's scope: the edge target becomes a parent
/// of the module scope and the sub-unit key is recorded in `collapsed`.
///
/// Nested sub-units are folded right after their host, so parent order stays
/// depth-first declaration order. Only a hard edge fails the whole module.
fn collapse_sub_unit(
	edge: &DependencyEdge,
	host: &ScopeKey,
	context: &BuildContext<'_, '_>,
	parents: &mut ParentScopes,
	collapsed: &mut Vec<ScopeKey>,
	warnings: &mut Vec<LoadError>,
) -> Result<(), LoadError> {

	let Some( sub_unit ) = edge.sub_unit() else { return Ok(()) };
	if edge.is_disabled_or_broken() { return Ok(()) }
	if !edge.is_hard() && !context.active.contains( edge.target()) { return Ok(()) }

	let key = host.sub_unit( edge.target().clone());
	match context.dependency_scope( &key, edge.target()) {
		Ok( scope ) => parents.add( scope ),
		Err( err ) if edge.is_hard() && !host.is_sub_unit() => return Err( err ),
		Err( err ) => {
			tracing::error!( scope = %key, error = %err, "Cannot activate sub-unit" );
			warnings.push( err );
			return Ok(());
		},
	}

	collapsed.push( key.clone());
	for nested in sub_unit.dependencies() {
		collapse_sub_unit( nested, &key, context, parents, collapsed, warnings )?;
	}
	Ok(())

}

/// Gives the sub-unit carried by `edge` a scope of its own, then recurses into
/// its nested sub-units.
///
/// The scope shares the host module's classpath and sees the host scope first,
/// then the dependency's scope. A sub-unit whose dependency is not enabled is
/// skipped silently.
fn configure_sub_unit(
	edge: &DependencyEdge,
	host: &ScopeKey,
	host_scope: &Arc<LoadingScope>,
	classpath: &Arc<[PathBuf]>,
	context: &BuildContext<'_, '_>,
	entries: &mut Entries,
	warnings: &mut Vec<LoadError>,
) {

	if edge.is_disabled_or_broken() { return }
	let Some( sub_unit ) = edge.sub_unit() else { return };
	if !context.active.contains( edge.target()) { return }

	let key = host.sub_unit( edge.target().clone());
	let dependency = match context.dependency_scope( &key, edge.target()) {
		Ok( scope ) => scope,
		Err( err ) => {
			tracing::error!( scope = %key, error = %err, "Cannot activate sub-unit" );
			warnings.push( err );
			return ;
		},
	};

	let prefixes = collect_prefixes( sub_unit );
	if prefixes.is_empty() {
		tracing::warn!( scope = %key, "Sub-unit doesn't define any extra symbols" );
		warnings.push( LoadError::EmptyVisibilitySurface { scope: key.clone() });
	}

	let mut parents = ParentScopes::new( context.bootstrap );
	parents.add( Arc::clone( host_scope ));
	parents.add( dependency );

	let scope = context.scope( key.clone(), ScopeKind::SubUnit, classpath, parents.into_vec(), Visibility::Prefixes( prefixes ));
	entries.push(( key.clone(), Arc::clone( &scope )));

	for nested in sub_unit.dependencies() {
		configure_sub_unit( nested, &key, &scope, classpath, context, entries, warnings );
	}

}
