use crate::{
    bind::{BoundHierarchy, bind_hierarchy},
    context::{BindingContext, MappingDefaults},
};
use ormbind_schema::{
    MappingError,
    hierarchy::build_hierarchies,
    index::{Index, IndexBuilder},
    node::{ClassMetadata, MemberMetadata, MemberTag, Tag},
    types::SharedCacheMode,
};
use parking_lot::Mutex;
use std::{collections::BTreeMap, fmt, sync::Arc};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{
    Layer,
    layer::{Context, SubscriberExt},
};

/// Index a list of classes that are known to be unique.
pub(crate) fn index_of(classes: Vec<ClassMetadata>) -> Index {
    let mut builder = IndexBuilder::new();
    for class in classes {
        builder
            .add_class(class)
            .expect("test fixture classes are unique");
    }

    builder.freeze()
}

/// Mapped superclass `Animal` with two direct entity subclasses.
pub(crate) fn zoo() -> Vec<ClassMetadata> {
    vec![
        ClassMetadata::new("zoo.Animal")
            .tag(Tag::MappedSuperclass)
            .member(MemberMetadata::field("id", "long").tag(MemberTag::Id))
            .member(MemberMetadata::field("legCount", "int")),
        ClassMetadata::new("zoo.Dog")
            .extends("zoo.Animal")
            .tag(Tag::entity())
            .member(MemberMetadata::field("name", "String")),
        ClassMetadata::new("zoo.Cat")
            .extends("zoo.Animal")
            .tag(Tag::entity())
            .member(MemberMetadata::field("color", "String")),
    ]
}

/// Build and bind every hierarchy of `index`.
pub(crate) fn bind_all(
    index: &Index,
    defaults: &MappingDefaults,
    mode: SharedCacheMode,
) -> Result<Vec<BoundHierarchy>, MappingError> {
    let ctx = BindingContext::root(index, defaults, mode);

    build_hierarchies(index)?
        .iter()
        .map(|hierarchy| bind_hierarchy(hierarchy, &ctx))
        .collect()
}

/// Bind `classes` with default settings, expecting success.
pub(crate) fn bind_classes(classes: Vec<ClassMetadata>) -> Vec<BoundHierarchy> {
    let index = index_of(classes);

    bind_all(&index, &MappingDefaults::default(), SharedCacheMode::Unspecified)
        .expect("fixture classes bind")
}

///
/// CapturedEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub(crate) fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

struct EventVisitor<'e>(&'e mut CapturedEvent);

impl Visit for EventVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_str(field, &format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0.message = value.to_string();
        } else {
            self.0
                .fields
                .insert(field.name().to_string(), value.to_string());
        }
    }
}

// Records every event it sees, in emission order.
#[derive(Clone, Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut captured = CapturedEvent {
            level: *event.metadata().level(),
            message: String::new(),
            fields: BTreeMap::new(),
        };
        event.record(&mut EventVisitor(&mut captured));

        self.events.lock().push(captured);
    }
}

/// Run `f` on this thread under a recording subscriber; returns its result
/// and the warnings it emitted.
pub(crate) fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<CapturedEvent>) {
    let layer = CaptureLayer::default();
    let events = Arc::clone(&layer.events);

    let result = tracing::subscriber::with_default(tracing_subscriber::registry().with(layer), f);
    let warnings = events
        .lock()
        .iter()
        .filter(|event| event.level == Level::WARN)
        .cloned()
        .collect();

    (result, warnings)
}
