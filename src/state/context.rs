use bitcoinkernel_sys::{
    btck_chain_parameters_create, btck_chain_parameters_destroy, btck_context_create,
    btck_context_destroy, btck_context_interrupt, btck_context_options_create,
    btck_context_options_destroy, btck_context_options_set_chainparams,
    btck_context_options_set_notifications, btck_context_options_set_validation_interface,
    btck_ChainParameters, btck_ChainType, btck_Context, btck_ContextOptions,
    BTCK_CHAIN_TYPE_MAINNET, BTCK_CHAIN_TYPE_REGTEST, BTCK_CHAIN_TYPE_SIGNET,
    BTCK_CHAIN_TYPE_TESTNET, BTCK_CHAIN_TYPE_TESTNET_4,
};

use crate::ffi::arena::Arena;
use crate::ffi::c_helpers;
use crate::ffi::handle::{impl_native_drop, NativeHandle};
use crate::notifications::notification::NotificationCallbackRegistry;
use crate::notifications::validation::ValidationCallbackRegistry;
use crate::KernelError;

impl_native_drop!(btck_ChainParameters, btck_chain_parameters_destroy);
impl_native_drop!(btck_ContextOptions, btck_context_options_destroy);
impl_native_drop!(btck_Context, btck_context_destroy);

/// The chain a context validates for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainType {
    Mainnet,
    Testnet,
    Testnet4,
    Signet,
    Regtest,
}

impl From<ChainType> for btck_ChainType {
    fn from(chain_type: ChainType) -> Self {
        match chain_type {
            ChainType::Mainnet => BTCK_CHAIN_TYPE_MAINNET,
            ChainType::Testnet => BTCK_CHAIN_TYPE_TESTNET,
            ChainType::Testnet4 => BTCK_CHAIN_TYPE_TESTNET_4,
            ChainType::Signet => BTCK_CHAIN_TYPE_SIGNET,
            ChainType::Regtest => BTCK_CHAIN_TYPE_REGTEST,
        }
    }
}

/// Consensus parameters for one chain.
pub struct ChainParams {
    inner: NativeHandle<btck_ChainParameters>,
}

unsafe impl Send for ChainParams {}
unsafe impl Sync for ChainParams {}

impl ChainParams {
    pub fn new(chain_type: ChainType) -> Result<Self, KernelError> {
        let ptr = unsafe { btck_chain_parameters_create(chain_type.into()) };
        Ok(ChainParams {
            inner: NativeHandle::wrap(ptr, "chain parameters")?,
        })
    }
}

/// The engine context: consensus parameters plus the registered callback
/// interfaces. Everything stateful in the engine hangs off one of these.
///
/// A context must outlive any [`crate::ChainstateManager`] created from it;
/// the manager enforces that by holding an `Arc<Context>`.
pub struct Context {
    inner: NativeHandle<btck_Context>,
    // Declared after `inner` so the engine object is destroyed first and no
    // callback can fire into freed registry state.
    #[allow(dead_code)]
    callbacks: Arena,
}

unsafe impl Send for Context {}
unsafe impl Sync for Context {}

impl Context {
    /// Asks the engine to abort long-running work, e.g. a block import.
    /// Advisory: in-flight calls return in their own time.
    pub fn interrupt(&self) -> Result<(), KernelError> {
        let result = unsafe { btck_context_interrupt(self.inner.get()? as *mut btck_Context) };
        if c_helpers::success(result) {
            Ok(())
        } else {
            Err(KernelError::InvalidState("interrupt failed".to_string()))
        }
    }

    pub(crate) fn as_ptr(&self) -> Result<*const btck_Context, KernelError> {
        self.inner.get()
    }
}

/// Builder for [`Context`]. Callback registries are moved into the context,
/// which keeps them alive and at stable addresses for the engine's lifetime.
pub struct ContextBuilder {
    chain_type: ChainType,
    notifications: Option<NotificationCallbackRegistry>,
    validation_interface: Option<ValidationCallbackRegistry>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        ContextBuilder {
            chain_type: ChainType::Mainnet,
            notifications: None,
            validation_interface: None,
        }
    }

    pub fn chain_type(mut self, chain_type: ChainType) -> Self {
        self.chain_type = chain_type;
        self
    }

    pub fn notifications(mut self, registry: NotificationCallbackRegistry) -> Self {
        self.notifications = Some(registry);
        self
    }

    pub fn validation_interface(mut self, registry: ValidationCallbackRegistry) -> Self {
        self.validation_interface = Some(registry);
        self
    }

    pub fn build(self) -> Result<Context, KernelError> {
        let mut callbacks = Arena::new();

        let chain_params = ChainParams::new(self.chain_type)?;
        let mut options =
            NativeHandle::wrap(unsafe { btck_context_options_create() }, "context options")?;
        unsafe {
            btck_context_options_set_chainparams(options.get_mut()?, chain_params.inner.get()?)
        };

        if let Some(registry) = self.notifications {
            let registry = callbacks.adopt(registry);
            unsafe {
                btck_context_options_set_notifications(
                    options.get_mut()?,
                    NotificationCallbackRegistry::to_c_callbacks(registry),
                )
            };
        }
        if let Some(registry) = self.validation_interface {
            let registry = callbacks.adopt(registry);
            unsafe {
                btck_context_options_set_validation_interface(
                    options.get_mut()?,
                    ValidationCallbackRegistry::to_c_callbacks(registry),
                )
            };
        }

        let inner = NativeHandle::wrap(unsafe { btck_context_create(options.get()?) }, "context")?;
        Ok(Context { inner, callbacks })
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
