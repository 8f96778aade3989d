//! Cooperative timers, polled once per host frame.
//!
//! A [`TimerPool`] owns [`TimerJob`]s grouped by owner. Every call to
//! [`TimerPool::handle`] checks each active job against the pool clock and
//! executes the ones whose period elapsed. A job fires on the tick closest to
//! its deadline, so its accuracy is bounded by the frame duration.

use std::cell::Cell;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use std::time::Instant;

use ahash::AHashMap;
use tracing::{trace, warn};

/// Source of time and frame rate for a [`TimerPool`].
pub trait FrameClock {
    /// Milliseconds since an arbitrary, fixed origin.
    fn now_millis(&self) -> u64;
    /// Frames per second the host is expected to poll the pool at.
    fn frame_rate(&self) -> f64;
}

/// Wall clock time.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
    frame_rate: f64,
}

impl SystemClock {
    pub fn new(frame_rate: f64) -> Self {
        Self {
            origin: Instant::now(),
            frame_rate,
        }
    }

    pub fn set_frame_rate(&mut self, frame_rate: f64) {
        self.frame_rate = frame_rate;
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(60.0)
    }
}

impl FrameClock for SystemClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }
}

/// Clock advanced by hand, for simulations and tests. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
    frame_rate: f64,
}

impl ManualClock {
    pub fn new(frame_rate: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(0)),
            frame_rate,
        }
    }

    pub fn advance(&self, millis: u64) {
        self.now.set(self.now.get() + millis);
    }

    pub fn set(&self, millis: u64) {
        self.now.set(millis);
    }

    /// Duration of a frame, rounded down to the millisecond.
    pub fn frame_millis(&self) -> u64 {
        frame_duration(self.frame_rate) as u64
    }
}

impl FrameClock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.get()
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }
}

fn frame_duration(frame_rate: f64) -> f64 {
    if frame_rate > 0.0 {
        1000.0 / frame_rate
    } else {
        0.0
    }
}

/// A task run by a timer.
pub trait Taskable {
    fn execute(&mut self);
}

impl<F: FnMut()> Taskable for F {
    fn execute(&mut self) {
        self()
    }
}

/// Identifier of a job within its [`TimerPool`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A periodic or one-shot task.
pub struct TimerJob {
    id: JobId,
    task: Box<dyn Taskable>,
    period: u64,
    active: bool,
    run_once: bool,
    start_time: u64,
    counter: u64,
    warned: bool,
}

impl TimerJob {
    fn new(id: JobId, task: Box<dyn Taskable>) -> Self {
        Self {
            id,
            task,
            period: 0,
            active: false,
            run_once: false,
            start_time: 0,
            counter: 1,
            warned: false,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    /// Period in milliseconds.
    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_run_once(&self) -> bool {
        self.run_once
    }

    /// Index of the next firing, starting at 1.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    fn start(&mut self, period: u64, run_once: bool, now: u64) {
        self.period = period;
        self.run_once = run_once;
        self.start_time = now;
        self.counter = 1;
        self.active = true;
        self.warned = false;
    }

    /// Whether the job fires on the tick happening at `now`.
    ///
    /// Advances the job, so it must be called once per tick.
    fn is_triggered(&mut self, now: u64, frame_rate: f64) -> bool {
        if !self.active {
            return false;
        }

        let frame = frame_duration(frame_rate);
        if (self.period as f64) < frame && !self.warned {
            warn!(
                job = %self.id,
                period = self.period,
                frame,
                "timer period is shorter than a frame, it will run at the frame rate"
            );
            self.warned = true;
        }

        let elapsed = now.saturating_sub(self.start_time) as f64;
        let threshold = (self.counter * self.period) as f64;
        let triggered = if elapsed > threshold {
            true
        } else {
            // Fire now if waiting for the next tick would overshoot the
            // deadline by more than firing early misses it.
            let overshoot = elapsed + frame - threshold;
            overshoot >= 0.0 && threshold - elapsed < overshoot
        };

        if triggered {
            self.counter += 1;
            if self.run_once {
                self.active = false;
            }
        }
        triggered
    }
}

impl fmt::Debug for TimerJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerJob")
            .field("id", &self.id)
            .field("period", &self.period)
            .field("active", &self.active)
            .field("run_once", &self.run_once)
            .field("start_time", &self.start_time)
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

/// Registry of timer jobs, grouped by owner.
///
/// Jobs are registered inactive and started with [`TimerPool::run`] or
/// [`TimerPool::run_once`]. They can be stopped and started again any number
/// of times. Jobs of different owners are executed in no particular order.
pub struct TimerPool<K, C = SystemClock> {
    clock: C,
    jobs: AHashMap<K, Vec<TimerJob>>,
    next_id: u64,
}

impl<K: Eq + Hash + fmt::Debug, C: FrameClock> TimerPool<K, C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            jobs: AHashMap::default(),
            next_id: 0,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Registers an inactive job running `task` under `owner`.
    pub fn register(&mut self, owner: K, task: impl Taskable + 'static) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;
        self.jobs
            .entry(owner)
            .or_default()
            .push(TimerJob::new(id, Box::new(task)));
        id
    }

    /// Registers a job and starts it with `period`.
    pub fn schedule(&mut self, owner: K, period: u64, task: impl Taskable + 'static) -> JobId {
        let id = self.register(owner, task);
        self.run(id, period);
        id
    }

    /// (Re)starts job `id`, firing every `period` milliseconds from now.
    pub fn run(&mut self, id: JobId, period: u64) -> bool {
        self.start(id, period, false)
    }

    /// (Re)starts job `id`, firing once after `period` milliseconds.
    pub fn run_once(&mut self, id: JobId, period: u64) -> bool {
        self.start(id, period, true)
    }

    fn start(&mut self, id: JobId, period: u64, run_once: bool) -> bool {
        let now = self.clock.now_millis();
        match self.job_mut(id) {
            Some(job) => {
                job.start(period, run_once, now);
                true
            }
            None => false,
        }
    }

    /// Inactivates job `id`. It stays registered and can be run again.
    pub fn stop(&mut self, id: JobId) -> bool {
        match self.job_mut(id) {
            Some(job) => {
                job.active = false;
                true
            }
            None => false,
        }
    }

    /// Same as [`TimerPool::stop`].
    pub fn cancel(&mut self, id: JobId) -> bool {
        self.stop(id)
    }

    pub fn is_active(&self, id: JobId) -> bool {
        self.job(id).is_some_and(TimerJob::is_active)
    }

    pub fn job(&self, id: JobId) -> Option<&TimerJob> {
        self.jobs.values().flatten().find(|job| job.id == id)
    }

    fn job_mut(&mut self, id: JobId) -> Option<&mut TimerJob> {
        self.jobs.values_mut().flatten().find(|job| job.id == id)
    }

    pub fn is_registered(&self, id: JobId) -> bool {
        self.job(id).is_some()
    }

    /// Jobs registered under `owner`.
    pub fn jobs(&self, owner: &K) -> impl Iterator<Item = &TimerJob> {
        self.jobs.get(owner).into_iter().flatten()
    }

    /// Removes every job of `owner`. Returns how many were removed.
    pub fn unregister_owner(&mut self, owner: &K) -> usize {
        self.jobs.remove(owner).map_or(0, |jobs| jobs.len())
    }

    /// Removes job `id` of `owner`.
    pub fn unregister(&mut self, owner: &K, id: JobId) -> bool {
        let Some(jobs) = self.jobs.get_mut(owner) else {
            return false;
        };
        let Some(index) = jobs.iter().position(|job| job.id == id) else {
            return false;
        };
        jobs.remove(index);
        if jobs.is_empty() {
            self.jobs.remove(owner);
        }
        true
    }

    /// Removes job `id`, whoever owns it.
    pub fn unregister_job(&mut self, id: JobId) -> bool {
        let removed = self.jobs.values_mut().any(|jobs| {
            match jobs.iter().position(|job| job.id == id) {
                Some(index) => {
                    jobs.remove(index);
                    true
                }
                None => false,
            }
        });
        if removed {
            self.jobs.retain(|_, jobs| !jobs.is_empty());
        }
        removed
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    /// Number of registered jobs.
    pub fn len(&self) -> usize {
        self.jobs.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Executes the jobs firing on this tick. Returns how many ran.
    pub fn handle(&mut self) -> usize {
        let now = self.clock.now_millis();
        let frame_rate = self.clock.frame_rate();

        let mut executed = 0;
        for (owner, jobs) in &mut self.jobs {
            for job in jobs.iter_mut() {
                if job.is_triggered(now, frame_rate) {
                    trace!(?owner, job = %job.id, counter = job.counter, now, "timer fired");
                    job.task.execute();
                    executed += 1;
                }
            }
        }
        executed
    }
}

impl<K: fmt::Debug, C: fmt::Debug> fmt::Debug for TimerPool<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerPool")
            .field("clock", &self.clock)
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let task = {
            let count = count.clone();
            move || count.set(count.get() + 1)
        };
        (count, task)
    }

    /// Ticks the pool until the first firing, returning the time it happened at.
    fn first_firing(pool: &mut TimerPool<&'static str, ManualClock>, step: u64) -> Option<u64> {
        for _ in 0..100 {
            pool.clock().advance(step);
            if pool.handle() > 0 {
                return Some(pool.clock().now_millis());
            }
        }
        None
    }

    #[test]
    fn fires_on_the_tick_closest_to_the_period() {
        let mut pool = TimerPool::new(ManualClock::new(62.5));
        let (count, task) = counter();
        pool.schedule("scene", 100, task);

        let fired = first_firing(&mut pool, 16).unwrap();
        assert!((84..=116).contains(&fired), "fired at {fired}");
        assert_eq!(fired, 96);
        assert_eq!(count.get(), 1);

        // The 192 tick is as far from the 200 deadline as the next one.
        assert_eq!(first_firing(&mut pool, 16), Some(208));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn run_once_jobs_inactivate() {
        let mut pool = TimerPool::new(ManualClock::new(100.0));
        let (count, task) = counter();
        let id = pool.register("scene", task);
        assert!(!pool.is_active(id));

        assert!(pool.run_once(id, 30));
        assert!(first_firing(&mut pool, 10).is_some());
        assert!(!pool.is_active(id));
        assert_eq!(first_firing(&mut pool, 10), None);
        assert_eq!(count.get(), 1);

        // Jobs are reused across runs.
        assert!(pool.run(id, 30));
        assert!(first_firing(&mut pool, 10).is_some());
        assert!(pool.is_active(id));
        assert_eq!(pool.job(id).map(TimerJob::counter), Some(2));
    }

    #[test]
    fn short_periods_run_every_frame() {
        let mut pool = TimerPool::new(ManualClock::new(50.0));
        let (count, task) = counter();
        pool.schedule("scene", 5, task);

        for _ in 0..10 {
            pool.clock().advance(20);
            pool.handle();
        }
        assert_eq!(count.get(), 10);
    }

    #[test]
    fn stopped_jobs_do_not_fire() {
        let mut pool = TimerPool::new(ManualClock::new(100.0));
        let (count, task) = counter();
        let id = pool.schedule("scene", 10, task);
        assert!(pool.stop(id));
        assert_eq!(first_firing(&mut pool, 10), None);
        assert_eq!(count.get(), 0);
        assert!(!pool.cancel(JobId(42)));
    }

    #[test]
    fn jobs_unregister_by_owner_and_id() {
        let mut pool = TimerPool::new(ManualClock::new(60.0));
        let a = pool.register("a", || {});
        let b = pool.register("a", || {});
        let c = pool.register("b", || {});
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.jobs(&"a").count(), 2);

        assert!(pool.unregister(&"a", a));
        assert!(!pool.unregister(&"b", b));
        assert!(pool.unregister_job(b));
        assert!(!pool.unregister_job(b));
        assert_eq!(pool.jobs(&"a").count(), 0);
        assert!(pool.is_registered(c));

        assert_eq!(pool.unregister_owner(&"b"), 1);
        assert!(pool.is_empty());

        pool.register("c", || {});
        pool.clear();
        assert!(pool.is_empty());
    }
}
