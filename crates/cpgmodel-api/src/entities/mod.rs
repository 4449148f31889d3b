pub mod attribute;
pub mod class;
pub mod instruction;
pub mod method;
pub mod modifiers;

pub use attribute::AttributeEntity;
pub use class::{ClassEntity, ClassType};
pub use instruction::InstructionEntity;
pub use method::{MethodEntity, Parameter, DEFAULT_CONSTRUCTOR_MARKER};
pub use modifiers::{Modifiers, PACKAGE_PRIVATE};
