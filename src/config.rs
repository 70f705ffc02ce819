//! Builder configuration.
//!
//! Resolved once by the caller and passed into [`GraphBuilder::new`]( crate::GraphBuilder::new ).
//! Nothing here is read from the process environment.

use std::collections::HashSet ;
use serde::Deserialize ;
use thiserror::Error ;

use crate::module::ModuleId ;



/// Error produced while reading a configuration document.
#[derive( Debug, Error )]
pub enum ConfigError {
	/// The document is not valid TOML or does not match the expected shape.
	#[error( "Invalid loader configuration: {0}" )]
	InvalidDocument( #[from] toml::de::Error ),
	/// The master switch property is neither `true` nor `false`.
	#[error( "Invalid boolean value for the split mode switch: '{0}'" )]
	InvalidSwitch( String ),
}

/// Settings that shape every graph build.
///
/// ```
/// use scope_link::LoaderConfig ;
///
/// let config = LoaderConfig::from_toml_str( r#"
/// 	core_id = "host"
///
/// 	[split]
/// 	deny = [ "org.legacy" ]
///
/// 	[implicit_dependency]
/// 	marker = "host.modules.all"
/// 	target = "host.java"
/// 	opt_out_prefix = "host.modules."
/// "# ).unwrap();
///
/// assert_eq!( config.core_id.as_str(), "host" );
/// assert!( !config.split.allows( &"org.legacy".into() ));
/// assert!( config.split.allows( &"org.yaml".into() ));
/// ```
#[derive( Debug, Clone, Deserialize )]
#[serde( default, deny_unknown_fields )]
pub struct LoaderConfig {
	/// The distinguished root module. It always resolves through the bootstrap scope.
	pub core_id: ModuleId,
	/// Which modules give each sub-unit a scope of its own.
	pub split: SplitModePolicy,
	/// Dependency added to legacy modules when the host declares an umbrella marker.
	pub implicit_dependency: Option<ImplicitDependency>,
}

impl Default for LoaderConfig {
	fn default() -> Self {
		Self {
			core_id: ModuleId::new( "core" ),
			split: SplitModePolicy::default(),
			implicit_dependency: None,
		}
	}
}

impl LoaderConfig {
	/// Parses a TOML document. Missing keys take their default values.
	pub fn from_toml_str( document: &str ) -> Result<Self, ConfigError> {
		Ok( toml::from_str( document )? )
	}
}

/// Eligibility of modules for split mode.
///
/// An explicit deny always wins; an empty allow-list admits every module.
#[derive( Debug, Clone, Deserialize )]
#[serde( default, deny_unknown_fields )]
pub struct SplitModePolicy {
	/// Master switch. When off, no module enters split mode.
	pub enabled: bool,
	pub allow: HashSet<ModuleId>,
	pub deny: HashSet<ModuleId>,
}

impl Default for SplitModePolicy {
	fn default() -> Self {
		Self { enabled: true, allow: HashSet::new(), deny: HashSet::new() }
	}
}

impl SplitModePolicy {

	/// Whether `id` gets one scope per sub-unit.
	pub fn allows( &self, id: &ModuleId ) -> bool {
		if !self.enabled || self.deny.contains( id ) { return false }
		self.allow.is_empty() || self.allow.contains( id )
	}

	/// Resolves the policy from its property form: a boolean master switch and
	/// two comma separated id lists. Absent values fall back to the defaults.
	pub fn from_properties(
		master: Option<&str>,
		only: Option<&str>,
		exclude: Option<&str>,
	) -> Result<Self, ConfigError> {
		let enabled = match master.map( str::trim ) {
			None => true,
			Some( value ) => value.parse::<bool>().map_err(|_| ConfigError::InvalidSwitch( value.to_string() ))?,
		};
		Ok( Self {
			enabled,
			allow: only.map( parse_id_list ).unwrap_or_default(),
			deny: exclude.map( parse_id_list ).unwrap_or_default(),
		})
	}
}

/// Splits a comma separated id list, ignoring blank items.
pub fn parse_id_list( value: &str ) -> HashSet<ModuleId> {
	value.split( ',' )
		.map( str::trim )
		.filter(| id | !id.is_empty() )
		.map( ModuleId::new )
		.collect()
}

/// A dependency the host attaches implicitly to modules that predate
/// fine-grained host modules.
#[derive( Debug, Clone, Deserialize )]
#[serde( deny_unknown_fields )]
pub struct ImplicitDependency {
	/// Only applied when a module providing this id is enabled.
	pub marker: ModuleId,
	/// The module whose scope becomes the first parent.
	pub target: ModuleId,
	/// Modules depending on any id with this prefix opt out.
	#[serde( default )]
	pub opt_out_prefix: Option<String>,
}
