use scope_link::{ LoaderConfig, ImplicitDependency, MemorySource, DependencyEdge, ModuleId, LoadError };
use crate::fixtures ;

fn config() -> LoaderConfig {
	LoaderConfig {
		implicit_dependency: Some( ImplicitDependency {
			marker: ModuleId::new( "host.modules.all" ),
			target: ModuleId::new( "host.java" ),
			opt_out_prefix: Some( "host.modules.".to_string() ),
		}),
		..LoaderConfig::default()
	}
}

fn modules() -> Vec<scope_link::ModuleDescriptor> {
	vec![
		fixtures::core_module().with_alias( "host.modules.all" ),
		fixtures::module( "host.java" ),
		fixtures::module( "host.modules.lang" ),
		fixtures::module( "old-plugin" ).with_dependency( DependencyEdge::required( "util" )),
		fixtures::module( "new-plugin" ).with_dependency( DependencyEdge::required( "host.modules.lang" )),
		fixtures::module( "util" ),
	]
}

#[test]
fn implicit_dependency_becomes_first_parent() {

	let modules = modules();
	let builder = fixtures::builder( config(), MemorySource::new());
	let ( graph, warnings ) = builder.build( &modules, &fixtures::all( &modules ));
	assert_no_warnings!( warnings );

	let parents = | id: &str | fixtures::names( graph.get( &ModuleId::new( id )).unwrap().parent_keys());
	assert_eq!( parents( "old-plugin" ), vec![ "host.java", "util" ]);
	assert_eq!( parents( "new-plugin" ), vec![ "host.modules.lang" ]);
	assert!( parents( "host.java" ).is_empty() );

}

#[test]
fn implicit_dependency_needs_marker() {

	let modules = modules();
	let enabled = fixtures::all( &modules ).into_iter()
		.filter(| id | id.as_str() != fixtures::CORE )
		.collect();

	let builder = fixtures::builder( config(), MemorySource::new());
	let ( graph, warnings ) = builder.build( &modules, &enabled );
	assert_no_warnings!( warnings );

	let old = graph.get( &ModuleId::new( "old-plugin" )).unwrap();
	assert_eq!( fixtures::names( old.parent_keys()), vec![ "util" ]);

}

#[test]
fn module_builds_without_implicit_dependency_requiring_it() {

	let modules = vec![
		fixtures::core_module().with_alias( "host.modules.all" ),
		fixtures::module( "legacy" ),
		fixtures::module( "host.java" ).with_dependency( DependencyEdge::required( "legacy" )),
	];
	let source = MemorySource::new()
		.with_symbol( fixtures::lib( "legacy" ), "org.legacy.Api", b"api".as_slice() );

	let builder = fixtures::builder( config(), source );
	let ( graph, warnings ) = builder.build( &modules, &fixtures::all( &modules ));

	match warnings.as_slice() {
		[ warning @ LoadError::ImplicitDependencyUnavailable { module, dependency }] => {
			assert_eq!(( module.as_str(), dependency.as_str()), ( "legacy", "host.java" ));
			assert!( warning.is_warning() );
		},
		other => panic!( "Unexpected diagnostics: {other:?}" ),
	}

	assert_eq!( fixtures::names( graph.keys()), vec![ "core", "legacy", "host.java" ]);
	let legacy = graph.get( &ModuleId::new( "legacy" )).unwrap();
	assert!( legacy.parent_keys().next().is_none() );

	let java = graph.get( &ModuleId::new( "host.java" )).unwrap();
	assert_eq!( fixtures::names( java.parent_keys()), vec![ "legacy" ]);
	assert!( java.resolve( "org.legacy.Api" ).is_some() );

}
