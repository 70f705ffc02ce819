//! Isolated, dependency-ordered loading scopes for modular applications.
//!
//! Modules are independently enable-able units of code. Each module declares
//! dependencies on other modules; some of those dependencies carry a
//! **sub-unit**, a fragment of the module that only activates when the
//! dependency is present too. `scope_link` turns a module set into a graph of
//! [`LoadingScope`]s in which every module sees its own symbols and those of its
//! dependencies, and nothing else.
//!
//! # Core Concepts
//!
//! - [`ModuleDescriptor`]: An installable module: id, aliases, root directory,
//! 	classpath and [`DependencyEdge`]s in declaration order.
//!
//! - [`LoadingScope`]: An isolation boundary. [`LoadingScope::resolve`] searches the
//! 	scope itself, then its parents depth-first in declaration order, then the
//! 	bootstrap scope. The first hit wins, so when two dependencies define the same
//! 	name the one declared first is the one every dependent sees.
//!
//! - **Bootstrap scope**: The host application's own code, created with
//! 	[`CoreBootstrapScope`]. It is the last resort of every resolution chain.
//!
//! - **Split mode**: Sub-units get a scope of their own whose visibility into the
//! 	host module is narrowed to the prefixes returned by [`collect_prefixes`].
//! 	Outside split mode sub-units share their module's scope. Which modules are
//! 	split is decided by [`SplitModePolicy`].
//!
//! - [`Graph`]: The immutable result of a build, queryable by module id or
//! 	[`ScopeKey`] and iterable in dependency order.
//!
//! - [`ScopeRegistry`]: The single owner of the live graph. It applies
//! 	[`ModuleDelta`]s incrementally and publishes each new graph through a
//! 	[`GraphHandle`], which readers on any thread load snapshots from.
//!
//! # Failure Handling
//!
//! Building never aborts. A module that cannot be built is reported as a
//! [`LoadError`] and left out of the graph together with its dependents; the
//! rest of the graph is built normally.
//!
//! # Example
//!
//! ```
//! use std::collections::HashSet ;
//! use scope_link::{
//! 	GraphBuilder, LoaderConfig, CoreBootstrapScope, MemorySource, ScopeKey,
//! 	ModuleDescriptor, DependencyEdge, SubUnitDescriptor, ExtensionDecl, ModuleId,
//! };
//!
//! let source = MemorySource::new()
//! 	.with_symbol( "/modules/yaml/lib", "org.yaml.Parser", b"parser".as_slice() )
//! 	.with_symbol( "/modules/editor/lib", "org.editor.Editor", b"editor".as_slice() )
//! 	.with_symbol( "/modules/editor/lib", "org.editor.yaml.YamlHighlighter", b"highlighter".as_slice() );
//!
//! let core = CoreBootstrapScope::new( "core", Vec::<String>::new(), MemorySource::new() );
//! let builder = GraphBuilder::new( LoaderConfig::default(), core, source );
//!
//! // The editor highlights YAML, but only when the YAML module is installed.
//! let yaml_support = SubUnitDescriptor::new()
//! 	.with_extension( ExtensionDecl::implementation( "highlighter", "org.editor.yaml.YamlHighlighter" ));
//!
//! let modules = [
//! 	ModuleDescriptor::new( "yaml", "/modules/yaml" ).with_classpath_entry( "lib" ),
//! 	ModuleDescriptor::new( "editor", "/modules/editor" )
//! 		.with_classpath_entry( "lib" )
//! 		.with_dependency( DependencyEdge::with_sub_unit( "yaml", yaml_support )),
//! ];
//! let enabled = modules.iter().map(| module | module.id().clone() ).collect::<HashSet<_>>();
//!
//! let ( graph, errors ) = builder.build( &modules, &enabled );
//! assert!( errors.is_empty() );
//!
//! // The editor itself cannot see the optional dependency...
//! let editor = graph.get( &ModuleId::new( "editor" )).unwrap();
//! assert!( editor.resolve( "org.yaml.Parser" ).is_none() );
//!
//! // ...but its YAML sub-unit can, and defines its own highlighter.
//! let sub_unit = graph.get_scope( &ScopeKey::module( "editor" ).sub_unit( "yaml" )).unwrap();
//! assert!( sub_unit.resolve( "org.yaml.Parser" ).is_some() );
//! let highlighter = sub_unit.resolve( "org.editor.yaml.YamlHighlighter" ).unwrap();
//! assert_eq!( highlighter.owner(), sub_unit.key() );
//! ```

mod module ;
mod prefix ;
mod config ;
mod source ;
mod scope ;
mod bootstrap ;
mod classpath ;
mod error ;
mod graph ;
mod building ;
mod reconfigure ;
mod restart ;
mod registry ;
mod utils ;

#[doc( no_inline )]
pub use nonempty_collections::NEVec ;

pub use module::{
	ModuleId, ModuleDescriptor, IsolationFlags, DependencyEdge,
	SubUnitDescriptor, ExtensionDecl, ServiceDecl, ServiceLevel,
};
pub use prefix::{ collect_prefixes, candidate_prefix, insert_prefix, IMPLEMENTATION_ATTRIBUTES, NAMESPACE_SEPARATOR, NESTED_MARKER };
pub use config::{ LoaderConfig, SplitModePolicy, ImplicitDependency, ConfigError, parse_id_list };
pub use source::{ SymbolSource, MemorySource };
pub use scope::{ LoadingScope, ScopeKey, ScopeId, ScopeKind, Symbol, Visibility };
pub use bootstrap::{ CoreBootstrapScope, ClassPathAppender, AppendError };
pub use error::LoadError ;
pub use graph::{ Graph, GraphHandle };
pub use building::GraphBuilder ;
pub use reconfigure::{ ModuleDelta, ReconfigureReport, Reconfigured };
pub use restart::{ RestartRequest, RestartSink };
pub use registry::ScopeRegistry ;
pub use utils::{ PartialSuccess, PartialResult };
