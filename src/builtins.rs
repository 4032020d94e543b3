//! Built-in names of the target UI runtime.
//!
//! Component names, decorator tags and runtime function names used by the
//! transformation pipeline and the code generator.

use lazy_static::lazy_static;
use std::collections::HashSet;

// ═══════════════════════════════════════════════════════════════════════════════
// DECORATOR TAGS
// ═══════════════════════════════════════════════════════════════════════════════

pub mod decorators {
    pub const COMPONENT: &str = "Component";
    pub const ENTRY: &str = "Entry";
    pub const PREVIEW: &str = "Preview";
    pub const CUSTOM_DIALOG: &str = "CustomDialog";
    pub const REUSABLE: &str = "Reusable";
    pub const COMPONENT_V2: &str = "ComponentV2";

    pub const STATE: &str = "State";
    pub const PROP: &str = "Prop";
    pub const LINK: &str = "Link";
    pub const PROVIDE: &str = "Provide";
    pub const CONSUME: &str = "Consume";

    pub const BUILDER: &str = "Builder";
    pub const LOCAL_BUILDER: &str = "LocalBuilder";
}

// ═══════════════════════════════════════════════════════════════════════════════
// RUNTIME FUNCTION NAMES
// ═══════════════════════════════════════════════════════════════════════════════

pub mod runtime {
    pub const CREATE: &str = "create";
    pub const POP: &str = "pop";
    pub const RENDER: &str = "render";
    pub const INITIAL_RENDER: &str = "initialRender";

    pub const CREATE_STATE: &str = "createState";
    pub const CREATE_PROP: &str = "createProp";
    pub const CREATE_LINK: &str = "createLink";
    pub const INITIALIZE_PROVIDE: &str = "initializeProvide";
    pub const INITIALIZE_CONSUME: &str = "initializeConsume";

    pub const OBSERVED_SIMPLE: &str = "ObservedPropertySimple";
    pub const OBSERVED_ONE_WAY: &str = "ObservedPropertySimpleOneWay";
    pub const OBSERVED_TWO_WAY: &str = "ObservedPropertySimpleTwoWay";

    pub const VIEW: &str = "View";
    pub const VIEW_STACK_PROCESSOR: &str = "ViewStackProcessor";
    pub const START_ACCESS_RECORDING: &str = "startGetAccessRecordingFor";
    pub const STOP_ACCESS_RECORDING: &str = "stopGetAccessRecording";
    pub const OBSERVE_COMPONENT_CREATION: &str = "observeComponentCreation";

    pub const BUILDER_PARAM_NAME: &str = "__builder__";

    /// Reserved suffix for private backing properties; chosen so it cannot
    /// collide with user identifiers the front-end accepts.
    pub const PRIVATE_SUFFIX: &str = "__";
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT TABLES
// ═══════════════════════════════════════════════════════════════════════════════

lazy_static! {
    /// Container components: may hold a child block.
    pub static ref CONTAINER_COMPONENTS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("Column");
        s.insert("Row");
        s.insert("Stack");
        s.insert("Flex");
        s.insert("Grid");
        s.insert("List");
        s.insert("Scroll");
        s.insert("Swiper");
        s.insert("Tabs");
        s.insert("Navigator");
        s.insert("GridRow");
        s.insert("GridCol");
        s.insert("RelativeContainer");
        s
    };

    /// Atomic components: leaves of the UI tree.
    pub static ref ATOMIC_COMPONENTS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("Text");
        s.insert("Image");
        s.insert("TextInput");
        s.insert("TextArea");
        s.insert("Button");
        s.insert("Toggle");
        s.insert("Checkbox");
        s.insert("Radio");
        s.insert("Slider");
        s.insert("Progress");
        s.insert("Divider");
        s.insert("Blank");
        s.insert("Span");
        s.insert("Select");
        s.insert("DatePicker");
        s.insert("TimePicker");
        s
    };

    /// Decorator tags that mark a class as a UI component.
    pub static ref COMPONENT_DECORATORS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert(decorators::COMPONENT);
        s.insert(decorators::COMPONENT_V2);
        s.insert(decorators::CUSTOM_DIALOG);
        s.insert(decorators::REUSABLE);
        s
    };
}

/// Control-flow constructs inside build bodies; bracketed with their own
/// create/pop pairs rather than the component protocol.
pub const FOR_EACH: &str = "ForEach";
pub const LAZY_FOR_EACH: &str = "LazyForEach";
pub const IF: &str = "If";

pub fn is_builtin_component(name: &str) -> bool {
    CONTAINER_COMPONENTS.contains(name) || ATOMIC_COMPONENTS.contains(name)
}

pub fn is_container_component(name: &str) -> bool {
    CONTAINER_COMPONENTS.contains(name)
}

pub fn is_loop_component(name: &str) -> bool {
    name == FOR_EACH || name == LAZY_FOR_EACH
}
