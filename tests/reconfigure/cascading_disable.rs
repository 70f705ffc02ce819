use scope_link::{ LoaderConfig, MemorySource, DependencyEdge, ModuleDelta, ModuleId, LoadError };
use crate::fixtures ;

#[test]
fn cascading_disable_removes_dependents() {

	let modules = vec![
		fixtures::module( "b" ),
		fixtures::module( "a" ).with_dependency( DependencyEdge::required( "b" )),
		fixtures::module( "top" ).with_dependency( DependencyEdge::required( "a" )),
		fixtures::module( "loose" ).with_dependency( DependencyEdge::optional( "b" )),
		fixtures::module( "unrelated" ),
	];
	let builder = fixtures::builder( LoaderConfig::default(), MemorySource::new());
	let ( graph, warnings ) = builder.build( &modules, &fixtures::all( &modules ));
	assert_no_warnings!( warnings );
	let unrelated = graph.get( &ModuleId::new( "unrelated" )).unwrap().id();

	let ( reconfigured, errors ) = builder.reconfigure( &graph, &modules, &ModuleDelta::new().disable( "b" ));

	let cascades = errors.iter()
		.map(| err | match err {
			LoadError::CascadingDisable { module, dependency } => ( module.as_str(), dependency.as_str()),
			other => panic!( "Unexpected diagnostic: {other}" ),
		})
		.collect::<Vec<_>>();
	assert_eq!( cascades, vec![( "a", "b" ), ( "top", "a" )]);

	let graph = reconfigured.graph ;
	let report = reconfigured.report ;
	assert_eq!( graph.modules().map( ModuleId::as_str ).collect::<Vec<_>>(), vec![ "loose", "unrelated" ]);
	assert_eq!( report.cascaded, vec![ ModuleId::new( "a" ), ModuleId::new( "top" )]);
	assert_eq!( fixtures::names( &report.removed ), vec![ "b", "a", "top" ]);
	assert!( !graph.enabled().contains( &ModuleId::new( "a" )));
	assert!( report.restart.is_none() );
	assert_eq!( graph.generation(), 1 );

	// Untouched modules keep their scope instance.
	assert_eq!( graph.get( &ModuleId::new( "unrelated" )).unwrap().id(), unrelated );
	assert!( !report.rebuilt.contains( &ModuleId::new( "unrelated" )));

}

#[test]
fn cascading_disable_leaves_old_scopes_usable() {

	let source = MemorySource::new().with_symbol( fixtures::lib( "b" ), "org.b.Api", b"b".as_slice() );
	let modules = vec![
		fixtures::module( "b" ),
		fixtures::module( "a" ).with_dependency( DependencyEdge::required( "b" )),
	];
	let builder = fixtures::builder( LoaderConfig::default(), source );
	let ( graph, _ ) = builder.build( &modules, &fixtures::all( &modules ));
	let a = std::sync::Arc::clone( graph.get( &ModuleId::new( "a" )).unwrap());

	let ( reconfigured, _ ) = builder.reconfigure( &graph, &modules, &ModuleDelta::new().disable( "b" ));
	drop( graph );

	assert!( reconfigured.graph.is_empty() );
	assert_eq!( a.resolve( "org.b.Api" ).unwrap().bytes(), b"b" );

}

#[test]
fn cascading_disable_unknown_ids_are_reported() {

	let modules = vec![ fixtures::module( "a" )];
	let builder = fixtures::builder( LoaderConfig::default(), MemorySource::new());
	let ( graph, _ ) = builder.build( &modules, &fixtures::all( &modules ));

	let ( reconfigured, errors ) = builder.reconfigure( &graph, &modules, &ModuleDelta::new().enable( "ghost" ));

	assert!( matches!( errors.as_slice(), [ LoadError::UnknownModule( id )] if id.as_str() == "ghost" ));
	assert!( reconfigured.graph.contains( &ModuleId::new( "a" )));
	assert!( reconfigured.report.rebuilt.is_empty() );

}
