//! Session and Stream Tests
//!
//! Filter sessions driven end to end by the JSON-lines object stream.
//!
//! Run: cargo nextest run --test session_and_stream_tests

use std::sync::Arc;

use serial_filter::config::{FilterProperties, SerialConfig};
use serial_filter::factory::FactoryRegistry;
use serial_filter::filter::create_filter;
use serial_filter::session::{EventLog, FilterSession, SessionError};
use serial_filter::stream::{ObjectGraph, ObjectReader, ObjectWriter, StreamError, Value};
use serial_filter::ClassRegistry;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn default_config() -> SerialConfig {
    SerialConfig::new(FilterProperties::default(), FactoryRegistry::builtins())
}

fn encode(graph: &ObjectGraph) -> Vec<u8> {
    let mut writer = ObjectWriter::new(Vec::new());
    writer.write_graph(graph).unwrap();
    writer.into_inner()
}

fn read_with(bytes: &[u8], config: &SerialConfig, pattern: &str) -> Result<ObjectGraph, StreamError> {
    let session = FilterSession::open(config).unwrap();
    let mut reader = ObjectReader::new(bytes, ClassRegistry::allow_unregistered(), session);
    reader.set_filter(create_filter(pattern).unwrap()).unwrap();
    reader.read_graph()
}

fn hashtable() -> ObjectGraph {
    let mut graph = ObjectGraph::new();
    let table = graph.add_object("java.util.Hashtable");
    let key = graph.add_string("answer");
    graph.set_field(table, "loadFactor", Value::Int(75));
    graph.set_field(table, "threshold", Value::Int(8));
    graph.set_field(table, "key", Value::Ref(key));
    graph.set_field(table, "value", Value::Int(42));
    graph.set_root(Value::Ref(table));
    graph
}

/// A linked list of `length` nodes; the last `next` field is null.
fn chain(length: usize) -> ObjectGraph {
    let mut graph = ObjectGraph::new();
    let nodes: Vec<_> = (0..length).map(|_| graph.add_object("x.Link")).collect();
    for pair in nodes.windows(2) {
        graph.set_field(pair[0], "next", Value::Ref(pair[1]));
    }
    if let Some(&last) = nodes.last() {
        graph.set_field(last, "next", Value::Null);
    }
    if let Some(&first) = nodes.first() {
        graph.set_root(Value::Ref(first));
    }
    graph
}

// =============================================================================
// End to end
// =============================================================================

mod end_to_end_tests {
    use super::*;

    #[test]
    fn test_hashtable_allowed() {
        init_tracing();
        let bytes = encode(&hashtable());
        let graph = read_with(&bytes, &default_config(), "java.util.Hashtable").unwrap();
        assert_eq!(graph.root_node().unwrap().class_name(), "java.util.Hashtable");
    }

    #[test]
    fn test_hashtable_rejected() {
        init_tracing();
        let bytes = encode(&hashtable());
        let err = read_with(&bytes, &default_config(), "!java.util.Hashtable").unwrap_err();
        assert!(err.is_rejection());
        let StreamError::Session(SessionError::Rejected { class, .. }) = err else {
            panic!("expected a filter rejection");
        };
        assert_eq!(class.as_deref(), Some("java.util.Hashtable"));
    }

    #[test]
    fn test_max_depth_boundary() {
        init_tracing();
        let config = default_config();

        let five = chain(5);
        assert_eq!(five.depth(), 5);
        read_with(&encode(&five), &config, "maxdepth=5").unwrap();

        let six = chain(6);
        assert_eq!(six.depth(), 6);
        let err = read_with(&encode(&six), &config, "maxdepth=5").unwrap_err();
        assert!(err.is_rejection());
    }

    #[test]
    fn test_max_refs_and_bytes() {
        let config = default_config();
        let bytes = encode(&chain(4));

        read_with(&bytes, &config, "maxrefs=4").unwrap();
        assert!(read_with(&bytes, &config, "maxrefs=3").unwrap_err().is_rejection());

        let total = bytes.len();
        read_with(&bytes, &config, &format!("maxbytes={total}")).unwrap();
        assert!(
            read_with(&bytes, &config, "maxbytes=10")
                .unwrap_err()
                .is_rejection()
        );
    }

    #[test]
    fn test_process_filter_applies_without_session_filter() {
        let config = SerialConfig::new(
            FilterProperties::default().with_filter_pattern("!x.**"),
            FactoryRegistry::builtins(),
        );
        let bytes = encode(&chain(2));
        let session = FilterSession::open(&config).unwrap();
        let reader = ObjectReader::new(&bytes[..], ClassRegistry::allow_unregistered(), session);
        assert!(reader.read_graph().unwrap_err().is_rejection());
    }
}

// =============================================================================
// Session rules
// =============================================================================

mod session_tests {
    use super::*;
    use serial_filter::SerialClass;
    use serial_filter::factory::FnFilterFactory;
    use serial_filter::filter::FilterRef;

    #[test]
    fn test_session_filter_only_once() {
        let mut session = FilterSession::open(&default_config()).unwrap();
        session.set_filter(create_filter("java.util.*").unwrap()).unwrap();
        let err = session
            .set_filter(create_filter("!*").unwrap())
            .unwrap_err();
        assert!(matches!(err, SessionError::FilterAlreadySet));
        assert_eq!(session.filter().unwrap().to_string(), "java.util.*");
    }

    #[test]
    fn test_session_filter_after_read() {
        let mut session = FilterSession::open(&default_config()).unwrap();
        session.enter_object().unwrap();
        session
            .check_class(&SerialClass::object("java.util.ArrayList"))
            .unwrap();
        assert!(matches!(
            session.set_filter(create_filter("!*").unwrap()),
            Err(SessionError::SetAfterRead)
        ));

        let relaxed = SerialConfig::new(
            FilterProperties::default().with_set_filter_after_read(true),
            FactoryRegistry::builtins(),
        );
        let mut session = FilterSession::open(&relaxed).unwrap();
        session.enter_object().unwrap();
        session.set_filter(create_filter("!*").unwrap()).unwrap();
        assert!(matches!(
            session.set_filter(create_filter("*").unwrap()),
            Err(SessionError::FilterAlreadySet)
        ));
    }

    #[test]
    fn test_null_session_filter() {
        let mut session = FilterSession::open(&default_config()).unwrap();
        session.set_filter(None).unwrap();
        session.set_filter(create_filter("x.*").unwrap()).unwrap();

        let config = SerialConfig::new(
            FilterProperties::default().with_filter_pattern("java.util.*"),
            FactoryRegistry::builtins(),
        );
        let dropping = FnFilterFactory::new("dropping", |current: Option<FilterRef>, next| {
            if current.is_none() { next } else { None }
        });
        config.set_filter_factory(Arc::new(dropping)).unwrap();
        let mut session = FilterSession::open(&config).unwrap();
        assert!(session.filter().is_some());
        assert!(matches!(
            session.set_filter(None),
            Err(SessionError::NullReplacement)
        ));
    }

    #[test]
    fn test_builtin_factory_refuses_null_replacement() {
        let config = SerialConfig::new(
            FilterProperties::default().with_filter_pattern("java.util.*"),
            FactoryRegistry::builtins(),
        );
        let mut session = FilterSession::open(&config).unwrap();
        assert!(session.filter().is_some());

        let err = session.set_filter(None).unwrap_err();
        assert!(matches!(err, SessionError::NullReplacement));
        assert!(matches!(
            session.set_filter(create_filter("x.*").unwrap()),
            Err(SessionError::FilterAlreadySet)
        ));
        assert_eq!(session.filter().unwrap().to_string(), "java.util.*");
    }

    #[test]
    fn test_rejection_aborts_session() {
        let mut session = FilterSession::open(&default_config()).unwrap();
        session.set_filter(create_filter("!*").unwrap()).unwrap();
        session.enter_object().unwrap();
        assert!(
            session
                .check_class(&SerialClass::object("a.B"))
                .unwrap_err()
                .is_rejection()
        );
        assert!(session.is_aborted());
        assert!(matches!(session.check_limits(), Err(SessionError::Aborted)));
        assert!(matches!(session.enter_object(), Err(SessionError::Aborted)));
    }

    #[test]
    fn test_events_describe_stream() {
        let log = Arc::new(EventLog::new());
        let bytes = encode(&hashtable());
        let session = FilterSession::open(&default_config())
            .unwrap()
            .with_event_sink(log.clone());
        let mut reader = ObjectReader::new(&bytes[..], ClassRegistry::allow_unregistered(), session);
        reader
            .set_filter(create_filter("java.util.*").unwrap())
            .unwrap();
        reader.read_graph().unwrap();

        let events = log.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].class.as_deref(), Some("java.util.Hashtable"));
        assert!(events[0].filter_configured);
        assert!(log.rejections().is_empty());

        let jsonl = log.to_json_lines().unwrap();
        assert!(jsonl.contains("\"status\":\"ALLOWED\""));
    }
}
