//! # mlog-ffi
//! C ABI bridge for the `mlog` logging core.
//!
//! Every exported function forwards to a process-wide manager and is
//! panic-free at the boundary: internal failures become the documented
//! integer return value, or are absorbed (and reported through the error
//! callback) for `void` functions. Function names follow the host-facing
//! contract, not Rust conventions.

#![allow(non_snake_case)]

use std::{
    ffi::{CStr, c_char, c_int},
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, LazyLock},
};

use mlog::{Level, LoggerConfig, LoggerManager};

static MANAGER: LazyLock<Arc<LoggerManager>> = LazyLock::new(|| Arc::new(LoggerManager::new()));

/// The singleton behind the bridge, exposed so embedding Rust code (and
/// tests) can share it with the facade adapter.
pub fn manager() -> Arc<LoggerManager> {
    Arc::clone(&MANAGER)
}

/// Null-safe, lossy C string conversion. Invalid UTF-8 is replaced, never
/// rejected: a diagnostic string must not be able to break the logger.
unsafe fn opt_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn init(
    log_path: *const c_char,
    max_file_size: usize,
    max_files: c_int,
    async_mode: c_int,
    thread_pool_size: c_int,
    min_log_level: c_int,
) -> c_int {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(path) = (unsafe { opt_str(log_path) }) else {
            return 0;
        };
        let min_level = match Level::try_from(min_log_level) {
            Ok(level) => level,
            Err(e) => {
                MANAGER.report_error("init", &e.to_string());
                return 0;
            }
        };
        if max_files < 0 || thread_pool_size < 0 {
            return 0;
        }
        let config = LoggerConfig {
            log_path: path.into(),
            max_file_size: max_file_size as u64,
            max_files: max_files as u32,
            async_mode: async_mode != 0,
            thread_pool_size: thread_pool_size as usize,
            min_level,
        };
        match MANAGER.initialize(config) {
            Ok(()) => 1,
            Err(_) => 0,
        }
    }))
    .unwrap_or(0)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn initDefault(log_path: *const c_char) -> c_int {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(path) = (unsafe { opt_str(log_path) }) else {
            return 0;
        };
        match MANAGER.initialize_default(path) {
            Ok(()) => 1,
            Err(_) => 0,
        }
    }))
    .unwrap_or(0)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn logMessage(log_level: c_int, message: *const c_char) {
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let Some(message) = (unsafe { opt_str(message) }) else {
            return;
        };
        match Level::try_from(log_level) {
            Ok(level) => MANAGER.log(level, &message),
            Err(e) => MANAGER.report_error("logMessage", &e.to_string()),
        }
    }));
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn logException(
    exception_type: *const c_char,
    message: *const c_char,
    stack_trace: *const c_char,
) {
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let exception_type = unsafe { opt_str(exception_type) };
        let message = unsafe { opt_str(message) };
        let stack_trace = unsafe { opt_str(stack_trace) };
        MANAGER.log_exception(
            exception_type.as_deref(),
            message.as_deref(),
            stack_trace.as_deref(),
        );
    }));
}

#[unsafe(no_mangle)]
pub extern "C" fn flush() {
    let _ = catch_unwind(AssertUnwindSafe(|| MANAGER.flush()));
}

#[unsafe(no_mangle)]
pub extern "C" fn setLogLevel(log_level: c_int) {
    let _ = catch_unwind(AssertUnwindSafe(|| match Level::try_from(log_level) {
        Ok(level) => MANAGER.set_log_level(level),
        Err(e) => MANAGER.report_error("setLogLevel", &e.to_string()),
    }));
}

#[unsafe(no_mangle)]
pub extern "C" fn getLogLevel() -> c_int {
    catch_unwind(AssertUnwindSafe(|| MANAGER.get_log_level().as_i32()))
        .unwrap_or(Level::Info.as_i32())
}

#[unsafe(no_mangle)]
pub extern "C" fn isInit() -> c_int {
    catch_unwind(AssertUnwindSafe(|| MANAGER.is_initialized() as c_int)).unwrap_or(0)
}

#[unsafe(no_mangle)]
pub extern "C" fn terminate() {
    let _ = catch_unwind(AssertUnwindSafe(|| MANAGER.terminate()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        ffi::CString,
        fs,
        path::PathBuf,
        ptr,
        sync::{Mutex, PoisonError},
    };

    // The bridge drives one process-wide singleton, so tests serialize on
    // a lock and terminate() before releasing it.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    fn lock() -> std::sync::MutexGuard<'static, ()> {
        TEST_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn test_path(name: &str) -> (PathBuf, CString) {
        let dir = PathBuf::from(format!("/tmp/mlog_test_ffi_{name}"));
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("app.log");
        let c_path = CString::new(path.to_str().unwrap()).unwrap();
        (path, c_path)
    }

    fn c(text: &str) -> CString {
        CString::new(text).unwrap()
    }

    #[test]
    fn test_full_lifecycle() {
        let _guard = lock();
        let (path, c_path) = test_path("lifecycle");

        assert_eq!(unsafe { init(c_path.as_ptr(), 0, 1, 0, 1, 2) }, 1);
        assert_eq!(isInit(), 1);
        assert_eq!(getLogLevel(), 2);

        unsafe { logMessage(2, c("hello from c").as_ptr()) };
        unsafe { logMessage(1, c("filtered debug").as_ptr()) };
        flush();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("hello from c"));
        assert!(!content.contains("filtered debug"));

        setLogLevel(4);
        assert_eq!(getLogLevel(), 4);
        setLogLevel(99);
        assert_eq!(getLogLevel(), 4);
        setLogLevel(-1);
        assert_eq!(getLogLevel(), 4);

        terminate();
        assert_eq!(isInit(), 0);
        assert_eq!(getLogLevel(), 2);
    }

    #[test]
    fn test_init_rejects_bad_arguments() {
        let _guard = lock();
        let (_, c_path) = test_path("rejects");

        assert_eq!(unsafe { init(ptr::null(), 0, 1, 0, 1, 2) }, 0);
        assert_eq!(unsafe { init(c("").as_ptr(), 0, 1, 0, 1, 2) }, 0);
        assert_eq!(unsafe { init(c_path.as_ptr(), 0, 0, 0, 1, 2) }, 0);
        assert_eq!(unsafe { init(c_path.as_ptr(), 0, 1, 0, 0, 2) }, 0);
        assert_eq!(unsafe { init(c_path.as_ptr(), 0, 1, 0, 1, 6) }, 0);
        assert_eq!(unsafe { init(c_path.as_ptr(), 0, 1, 0, 1, -1) }, 0);
        assert_eq!(isInit(), 0);
        terminate();
    }

    #[test]
    fn test_init_default() {
        let _guard = lock();
        let (path, c_path) = test_path("default");

        assert_eq!(unsafe { initDefault(c_path.as_ptr()) }, 1);
        assert_eq!(isInit(), 1);
        assert_eq!(getLogLevel(), 2);
        unsafe { logMessage(4, c("default config write").as_ptr()) };
        flush();
        assert!(fs::read_to_string(&path).unwrap().contains("default config write"));
        terminate();

        assert_eq!(unsafe { initDefault(ptr::null()) }, 0);
    }

    #[test]
    fn test_void_functions_safe_before_init() {
        let _guard = lock();
        terminate();
        unsafe { logMessage(2, c("goes nowhere").as_ptr()) };
        unsafe { logException(ptr::null(), ptr::null(), ptr::null()) };
        flush();
        setLogLevel(3);
        terminate();
        assert_eq!(isInit(), 0);
        assert_eq!(getLogLevel(), 2);
    }

    #[test]
    fn test_log_message_null_safe() {
        let _guard = lock();
        let (path, c_path) = test_path("null_msg");
        assert_eq!(unsafe { init(c_path.as_ptr(), 0, 1, 0, 1, 0) }, 1);
        unsafe { logMessage(2, ptr::null()) };
        unsafe { logMessage(7, c("bad level").as_ptr()) };
        flush();
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("bad level"));
        terminate();
    }

    #[test]
    fn test_log_exception_null_fields() {
        let _guard = lock();
        let (path, c_path) = test_path("exception");
        assert_eq!(unsafe { init(c_path.as_ptr(), 0, 1, 0, 1, 2) }, 1);

        unsafe { logException(ptr::null(), ptr::null(), ptr::null()) };
        unsafe {
            logException(
                c("System.NullReferenceException").as_ptr(),
                c("object was null").as_ptr(),
                c("at Game.Update()").as_ptr(),
            )
        };
        flush();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[EXCEPTION] \n"));
        assert!(content.contains(
            "[EXCEPTION] System.NullReferenceException: object was null\nat Game.Update()"
        ));
        terminate();
    }

    #[test]
    fn test_async_init_through_bridge() {
        let _guard = lock();
        let (path, c_path) = test_path("async");
        assert_eq!(unsafe { init(c_path.as_ptr(), 0, 1, 1, 2, 2) }, 1);
        for i in 0..50 {
            unsafe { logMessage(3, c(&format!("async msg {i}")).as_ptr()) };
        }
        flush();
        let content = fs::read_to_string(&path).unwrap();
        for i in 0..50 {
            assert!(content.contains(&format!("async msg {i}")));
        }
        terminate();
        assert_eq!(isInit(), 0);
    }

    #[test]
    fn test_invalid_level_reported_through_callback() {
        let _guard = lock();
        let (_, c_path) = test_path("callback");
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let sink = std::sync::Arc::clone(&seen);
        manager().set_error_callback(Some(Box::new(move |message, operation| {
            sink.lock()
                .unwrap()
                .push((message.to_string(), operation.to_string()));
        })));

        assert_eq!(unsafe { init(c_path.as_ptr(), 0, 1, 0, 1, 2) }, 1);
        unsafe { logMessage(42, c("never written").as_ptr()) };
        setLogLevel(-5);

        {
            let seen = seen.lock().unwrap();
            let operations: Vec<&str> = seen.iter().map(|(_, op)| op.as_str()).collect();
            assert_eq!(operations, ["logMessage", "setLogLevel"]);
            assert!(seen[0].0.contains("42"));
        }

        manager().set_error_callback(None);
        terminate();
    }

    #[test]
    fn test_reinit_through_bridge() {
        let _guard = lock();
        let (old_path, c_old) = test_path("reinit_old");
        let (new_path, c_new) = test_path("reinit_new");

        assert_eq!(unsafe { init(c_old.as_ptr(), 0, 1, 0, 1, 2) }, 1);
        unsafe { logMessage(2, c("first file").as_ptr()) };
        assert_eq!(unsafe { init(c_new.as_ptr(), 0, 1, 0, 1, 2) }, 1);
        unsafe { logMessage(2, c("second file").as_ptr()) };
        flush();

        assert!(fs::read_to_string(&old_path).unwrap().contains("first file"));
        assert!(fs::read_to_string(&new_path).unwrap().contains("second file"));
        terminate();
    }
}
