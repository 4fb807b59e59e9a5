//! Защита от переполнения стека при обходе глубоко вложенных типов.

// 256KB red zone, 8MB stack growth
const RED_ZONE: usize = 256 * 1024;
const STACK_GROWTH: usize = 8 * 1024 * 1024;

/// Выполнить рекурсивный шаг, при необходимости переключившись на новый
/// сегмент стека.
#[inline]
pub(crate) fn guarded<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_GROWTH, f)
}
