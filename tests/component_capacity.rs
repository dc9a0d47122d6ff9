//! Exhausts the process-wide component id space, so it runs in its own test
//! binary.

use signet::prelude::*;

macro_rules! components {
    ($($t:ident),* $(,)?) => {
        $(
            #[derive(Component, Debug, PartialEq)]
            struct $t;
        )*
    };
}

components!(
    C0, C1, C2, C3, C4, C5, C6, C7, C8, C9, C10, C11, C12, C13, C14, C15, C16,
    C17, C18, C19, C20, C21, C22, C23, C24, C25, C26, C27, C28, C29, C30, C31,
);

/// One more than fits.
#[derive(Component, Debug, PartialEq)]
struct Overflow;

/// Generic components take the shared lookup path.
#[allow(dead_code)]
struct Generic<T>(T);

impl<T: Send + Sync + 'static> Component for Generic<T> {}

struct NeedsOverflow;

impl SystemLogic for NeedsOverflow {
    fn require(&self, system: &mut System) -> Result<(), ComponentCapacityError> {
        system.require_component::<Overflow>()?;

        Ok(())
    }
}

#[test]
fn capacity_is_enforced_without_wrapping() {
    let mut registry = Registry::new();
    let entity = registry.create_entity();

    macro_rules! fill {
        ($($t:ident),*) => {
            [$(
                registry
                    .add_component(entity, $t)
                    .map(|_| ComponentId::of::<$t>().unwrap())
            ),*]
        };
    }

    let ids = fill!(
        C0, C1, C2, C3, C4, C5, C6, C7, C8, C9, C10, C11, C12, C13, C14, C15,
        C16, C17, C18, C19, C20, C21, C22, C23, C24, C25, C26, C27, C28, C29,
        C30, C31
    );
    let mut indices: Vec<_> = ids.iter().map(|id| id.unwrap().index()).collect();

    indices.sort_unstable();
    indices.dedup();

    assert_eq!(indices, (0..MAX_COMPONENTS).collect::<Vec<_>>());
    assert_eq!(registry.signature(entity).unwrap().len(), MAX_COMPONENTS);

    // the next new type fails, every time
    let error = ComponentId::of::<Overflow>().unwrap_err();

    assert!(error.type_name.ends_with("Overflow"));
    assert_eq!(ComponentId::of::<Overflow>(), Err(error));
    assert_eq!(
        ComponentId::of::<Generic<u8>>(),
        Err(ComponentCapacityError {
            type_name: std::any::type_name::<Generic<u8>>(),
        }),
    );

    assert_eq!(
        registry.add_component(entity, Overflow).map(|_| ()),
        Err(ComponentError::Capacity(error)),
    );
    assert_eq!(
        registry.add_system(NeedsOverflow),
        Err(SystemError::Capacity(error)),
    );
    assert!(!registry.has_system::<NeedsOverflow>());
    assert!(!registry.has_component::<Overflow>(entity));
    assert_eq!(registry.remove_component::<Overflow>(entity), Ok(None));

    // already assigned ids keep working
    assert_eq!(ComponentId::of::<C7>().ok(), ids[7].ok());
    assert_eq!(registry.remove_component::<C7>(entity), Ok(Some(C7)));
    assert!(registry.component::<C31>(entity).is_ok());
}
