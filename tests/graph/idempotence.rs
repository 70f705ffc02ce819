use scope_link::{ LoaderConfig, MemorySource, DependencyEdge, Graph };
use crate::fixtures ;

fn shape( graph: &Graph ) -> Vec<( String, Vec<String>, Vec<String> )> {
	graph.iter()
		.map(|( key, scope )| (
			key.to_string(),
			fixtures::names( scope.parent_keys()),
			scope.allowed_prefixes().to_vec(),
		))
		.collect()
}

#[test]
fn idempotence_same_input_same_shape() {

	let modules = vec![
		fixtures::core_module(),
		fixtures::module( "lib" ).with_dependency( DependencyEdge::required( "core" )),
		fixtures::module( "tool" ),
		fixtures::module( "app" )
			.with_dependency( DependencyEdge::required( "lib" ))
			.with_dependency( DependencyEdge::with_sub_unit( "tool", fixtures::sub_unit_implementing( "org.app.tool.Bridge" )
				.with_extension( scope_link::ExtensionDecl::implementation( "other", "org.app.tool.more.Helper" ))))
			.with_dependency( DependencyEdge::optional( "tool" )),
	];
	let enabled = fixtures::all( &modules );
	let builder = fixtures::builder( LoaderConfig::default(), MemorySource::new());

	let ( first, warnings ) = builder.build( &modules, &enabled );
	assert_no_warnings!( warnings );
	let ( second, warnings ) = builder.build( &modules, &enabled );
	assert_no_warnings!( warnings );

	assert_eq!( shape( &first ), shape( &second ));
	assert_eq!( first.generation(), second.generation() );
	assert_eq!( shape( &first ).last().unwrap().2, vec![ "org.app.tool." ]);

	// Separate builds never share scope instances.
	let app = fixtures::key( "app" );
	assert_ne!( first.get_scope( &app ).unwrap().id(), second.get_scope( &app ).unwrap().id() );

}
