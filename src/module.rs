//! Module metadata types.
//!
//! A module is an independently enable-able unit of code. It declares dependencies
//! on other modules through [`DependencyEdge`]s, some of which carry a
//! [`SubUnitDescriptor`]: a fragment of the module that only activates when the
//! edge's target is also present.

use std::path::{ Path, PathBuf };
use std::sync::Arc ;
use serde::Deserialize ;



/// Unique identifier of a module.
///
/// Cloning is cheap; the underlying string is shared.
#[derive( Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize )]
#[serde( from = "String" )]
pub struct ModuleId( Arc<str> );

impl ModuleId {
	/// Creates a new module id.
	pub fn new( id: impl AsRef<str> ) -> Self { Self( Arc::from( id.as_ref() )) }

	/// The id as a string slice.
	#[inline] pub fn as_str( &self ) -> &str { &self.0 }
}

impl From<&str> for ModuleId {
	fn from( id: &str ) -> Self { Self::new( id ) }
}

impl From<String> for ModuleId {
	fn from( id: String ) -> Self { Self( Arc::from( id )) }
}

impl std::fmt::Display for ModuleId {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		std::fmt::Display::fmt( &self.0, f )
	}
}

impl std::fmt::Debug for ModuleId {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		std::fmt::Debug::fmt( &self.0, f )
	}
}

/// Flags that opt a module out of isolation.
#[derive( Debug, Clone, Copy, Default, PartialEq, Eq )]
pub struct IsolationFlags {
	/// The module (and its sub-units) resolve everything through the bootstrap scope.
	pub uses_host_scope_directly: bool,
	/// Deprecated: the module's classpath is appended to the host loader instead
	/// of getting a scope of its own.
	pub uses_legacy_single_scope: bool,
}

/// An installable module.
#[derive( Debug, Clone )]
pub struct ModuleDescriptor {
	id: ModuleId,
	aliases: Vec<ModuleId>,
	root: PathBuf,
	classpath: Vec<PathBuf>,
	dependencies: Vec<DependencyEdge>,
	flags: IsolationFlags,
}

impl ModuleDescriptor {

	/// Creates a module rooted at `root` with no classpath and no dependencies.
	pub fn new( id: impl Into<ModuleId>, root: impl Into<PathBuf> ) -> Self {
		Self {
			id: id.into(),
			aliases: Vec::with_capacity( 0 ),
			root: root.into(),
			classpath: Vec::with_capacity( 0 ),
			dependencies: Vec::with_capacity( 0 ),
			flags: IsolationFlags::default(),
		}
	}

	/// Appends a classpath entry. Relative entries are resolved against the module root.
	pub fn with_classpath_entry( mut self, entry: impl Into<PathBuf> ) -> Self {
		self.classpath.push( entry.into());
		self
	}

	/// Appends a dependency edge. Declaration order is resolution order.
	pub fn with_dependency( mut self, edge: DependencyEdge ) -> Self {
		self.dependencies.push( edge );
		self
	}

	/// Declares an additional id this module provides.
	pub fn with_alias( mut self, alias: impl Into<ModuleId> ) -> Self {
		self.aliases.push( alias.into());
		self
	}

	/// Replaces the isolation flags.
	pub fn with_flags( mut self, flags: IsolationFlags ) -> Self {
		self.flags = flags ;
		self
	}

	#[inline] pub fn id( &self ) -> &ModuleId { &self.id }
	#[inline] pub fn aliases( &self ) -> &[ModuleId] { &self.aliases }
	#[inline] pub fn root( &self ) -> &Path { &self.root }
	#[inline] pub fn classpath( &self ) -> &[PathBuf] { &self.classpath }
	#[inline] pub fn dependencies( &self ) -> &[DependencyEdge] { &self.dependencies }
	#[inline] pub fn flags( &self ) -> IsolationFlags { self.flags }

	/// Whether `id` names this module, directly or through an alias.
	pub fn provides( &self, id: &ModuleId ) -> bool {
		&self.id == id || self.aliases.contains( id )
	}

	/// Edges declared by the module's sub-units, nested ones included, in
	/// declaration order.
	pub(crate) fn sub_unit_edges( &self ) -> impl Iterator<Item = &DependencyEdge> {
		let mut stack = self.dependencies.iter()
			.rev()
			.filter_map( DependencyEdge::sub_unit )
			.flat_map(| sub_unit | sub_unit.dependencies().iter().rev())
			.collect::<Vec<_>>();
		std::iter::from_fn( move || {
			let edge = stack.pop()?;
			if let Some( sub_unit ) = edge.sub_unit() {
				stack.extend( sub_unit.dependencies().iter().rev());
			}
			Some( edge )
		})
	}

	/// Every edge this module may consult, its own first.
	pub(crate) fn all_edges( &self ) -> impl Iterator<Item = &DependencyEdge> {
		self.dependencies.iter().chain( self.sub_unit_edges())
	}
}

/// A dependency declared by a module or sub-unit on another module.
#[derive( Debug, Clone )]
pub struct DependencyEdge {
	target: ModuleId,
	is_optional: bool,
	is_disabled_or_broken: bool,
	sub_unit: Option<Box<SubUnitDescriptor>>,
}

impl DependencyEdge {

	/// A mandatory dependency.
	pub fn required( target: impl Into<ModuleId> ) -> Self {
		Self { target: target.into(), is_optional: false, is_disabled_or_broken: false, sub_unit: None }
	}

	/// An optional dependency with no extra behaviour attached.
	pub fn optional( target: impl Into<ModuleId> ) -> Self {
		Self { is_optional: true, ..Self::required( target ) }
	}

	/// An optional dependency that activates `sub_unit` when the target is present.
	pub fn with_sub_unit( target: impl Into<ModuleId>, sub_unit: SubUnitDescriptor ) -> Self {
		Self { sub_unit: Some( Box::new( sub_unit )), ..Self::optional( target ) }
	}

	/// Marks the edge as unusable; it is ignored by every graph operation.
	pub fn disabled_or_broken( mut self ) -> Self {
		self.is_disabled_or_broken = true ;
		self
	}

	/// Overrides optionality, e.g. for a mandatory edge that still carries a sub-unit.
	pub fn set_optional( mut self, is_optional: bool ) -> Self {
		self.is_optional = is_optional ;
		self
	}

	#[inline] pub fn target( &self ) -> &ModuleId { &self.target }
	#[inline] pub fn is_optional( &self ) -> bool { self.is_optional }
	#[inline] pub fn is_disabled_or_broken( &self ) -> bool { self.is_disabled_or_broken }
	#[inline] pub fn sub_unit( &self ) -> Option<&SubUnitDescriptor> { self.sub_unit.as_deref() }

	/// Non-optional, usable edge: the dependent cannot load without its target.
	#[inline] pub(crate) fn is_hard( &self ) -> bool { !self.is_optional && !self.is_disabled_or_broken }
}

/// The part of a module that only exists when a specific dependency is present.
///
/// A sub-unit shares its host module's classpath; what it gets of its own is a
/// narrower visibility, derived from the extensions and services it declares.
#[derive( Debug, Clone, Default )]
pub struct SubUnitDescriptor {
	extensions: Vec<ExtensionDecl>,
	services: Vec<ServiceDecl>,
	dependencies: Vec<DependencyEdge>,
}

impl SubUnitDescriptor {
	pub fn new() -> Self { Self::default() }

	pub fn with_extension( mut self, extension: ExtensionDecl ) -> Self {
		self.extensions.push( extension );
		self
	}

	pub fn with_service( mut self, service: ServiceDecl ) -> Self {
		self.services.push( service );
		self
	}

	/// Nested sub-units are introduced through their own edges.
	pub fn with_dependency( mut self, edge: DependencyEdge ) -> Self {
		self.dependencies.push( edge );
		self
	}

	#[inline] pub fn extensions( &self ) -> &[ExtensionDecl] { &self.extensions }
	#[inline] pub fn services( &self ) -> &[ServiceDecl] { &self.services }
	#[inline] pub fn dependencies( &self ) -> &[DependencyEdge] { &self.dependencies }
}

/// An extension registered by a sub-unit, reduced to its attributes.
#[derive( Debug, Clone, Default )]
pub struct ExtensionDecl {
	point: String,
	attributes: Vec<( String, String )>,
}

impl ExtensionDecl {
	pub fn new( point: impl Into<String> ) -> Self {
		Self { point: point.into(), attributes: Vec::with_capacity( 0 ) }
	}

	/// Shorthand for an extension whose `implementation` attribute is `name`.
	pub fn implementation( point: impl Into<String>, name: impl Into<String> ) -> Self {
		Self::new( point ).with_attribute( "implementation", name )
	}

	pub fn with_attribute( mut self, name: impl Into<String>, value: impl Into<String> ) -> Self {
		self.attributes.push(( name.into(), value.into() ));
		self
	}

	#[inline] pub fn point( &self ) -> &str { &self.point }

	pub fn attribute( &self, name: &str ) -> Option<&str> {
		self.attributes.iter()
			.find(|( key, _ )| key == name )
			.map(|( _, value )| value.as_str() )
	}

	#[inline] pub fn has_attributes( &self ) -> bool { !self.attributes.is_empty() }
}

/// The container a service is registered in.
#[derive( Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash )]
pub enum ServiceLevel { Application, Project, Module }

/// A service registered by a sub-unit.
#[derive( Debug, Clone )]
pub struct ServiceDecl {
	level: ServiceLevel,
	implementation: Option<String>,
	headless_implementation: Option<String>,
	test_implementation: Option<String>,
}

impl ServiceDecl {
	pub fn new( level: ServiceLevel ) -> Self {
		Self { level, implementation: None, headless_implementation: None, test_implementation: None }
	}

	pub fn with_implementation( mut self, name: impl Into<String> ) -> Self {
		self.implementation = Some( name.into());
		self
	}

	pub fn with_headless_implementation( mut self, name: impl Into<String> ) -> Self {
		self.headless_implementation = Some( name.into());
		self
	}

	pub fn with_test_implementation( mut self, name: impl Into<String> ) -> Self {
		self.test_implementation = Some( name.into());
		self
	}

	#[inline] pub fn level( &self ) -> ServiceLevel { self.level }
	#[inline] pub fn implementation( &self ) -> Option<&str> { self.implementation.as_deref() }
	#[inline] pub fn headless_implementation( &self ) -> Option<&str> { self.headless_implementation.as_deref() }
	#[inline] pub fn test_implementation( &self ) -> Option<&str> { self.test_implementation.as_deref() }
}
