use std::path::{ Path, PathBuf };
use std::sync::{ Arc, Mutex };
use scope_link::{
	LoaderConfig, MemorySource, DependencyEdge, IsolationFlags, ModuleId,
	ClassPathAppender, AppendError, LoadError,
};
use crate::fixtures ;

fn legacy() -> IsolationFlags {
	IsolationFlags { uses_legacy_single_scope: true, ..IsolationFlags::default() }
}

#[test]
fn legacy_single_scope_appends_to_bootstrap() {

	let source = MemorySource::new().with_symbol( fixtures::lib( "old" ), "org.old.Thing", b"old".as_slice() );
	let modules = vec![
		fixtures::module( "old" )
			.with_flags( legacy())
			.with_dependency( DependencyEdge::with_sub_unit( "modern", fixtures::sub_unit_implementing( "org.old.modern.Bridge" ))),
		fixtures::module( "modern" ),
	];

	let builder = fixtures::builder( LoaderConfig::default(), source );
	let ( graph, warnings ) = builder.build( &modules, &fixtures::all( &modules ));
	assert_no_warnings!( warnings );

	assert_eq!( graph.bootstrap().appended_classpath(), vec![ PathBuf::from( "/modules/old/lib" )]);
	assert!( Arc::ptr_eq( graph.get( &ModuleId::new( "old" )).unwrap(), graph.bootstrap() ));
	assert!( Arc::ptr_eq( graph.get_scope( &fixtures::key( "old/modern" )).unwrap(), graph.bootstrap() ));

	// Everyone sees the legacy module through the bootstrap fallback.
	let modern = graph.get( &ModuleId::new( "modern" )).unwrap();
	assert_eq!( modern.resolve( "org.old.Thing" ).unwrap().owner().to_string(), "core" );

	// Building again does not append twice.
	let _ = builder.build( &modules, &fixtures::all( &modules ));
	assert_eq!( graph.bootstrap().appended_classpath().len(), 1 );

}

#[test]
fn legacy_single_scope_still_checks_dependencies() {

	let modules = vec![
		fixtures::module( "old" ).with_flags( legacy()).with_dependency( DependencyEdge::required( "gone" )),
	];

	let builder = fixtures::builder( LoaderConfig::default(), MemorySource::new());
	let ( graph, errors ) = builder.build( &modules, &fixtures::all( &modules ));

	assert!( matches!( errors.as_slice(), [ LoadError::MissingDependencyScope { .. }]));
	assert!( graph.is_empty() );
	assert!( graph.bootstrap().appended_classpath().is_empty() );

}

#[derive( Default )]
struct RecordingHost {
	accepted: Mutex<Vec<PathBuf>>,
}

impl ClassPathAppender for RecordingHost {
	fn append_classpath_entry( &self, location: &Path ) -> Result<(), AppendError> {
		if location.ends_with( "native" ) {
			return Err( AppendError::Rejected { entry: location.to_path_buf(), reason: "native code".to_string() });
		}
		self.accepted.lock().unwrap().push( location.to_path_buf());
		Ok(())
	}
}

#[test]
fn legacy_single_scope_custom_host() {

	let host = Arc::new( RecordingHost::default());
	let modules = vec![
		fixtures::module( "old" ).with_flags( legacy()),
		fixtures::module( "native" ).with_flags( legacy()).with_classpath_entry( "native" ),
	];

	let builder = fixtures::builder( LoaderConfig::default(), MemorySource::new())
		.with_legacy_host( Arc::clone( &host ) as Arc<dyn ClassPathAppender> );
	let ( graph, errors ) = builder.build( &modules, &fixtures::all( &modules ));

	match errors.as_slice() {
		[ LoadError::LegacyClasspathRejected { module, source: AppendError::Rejected { .. }}] => assert_eq!( module.as_str(), "native" ),
		other => panic!( "Unexpected diagnostics: {other:?}" ),
	}
	assert_eq!( fixtures::names( graph.keys()), vec![ "old" ]);
	assert!( graph.bootstrap().appended_classpath().is_empty() );
	assert_eq!( *host.accepted.lock().unwrap(), vec![
		PathBuf::from( "/modules/old/lib" ),
		PathBuf::from( "/modules/native/lib" ),
	]);

}
