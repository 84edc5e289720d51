use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::applications::{Application, ApplicationId, ApplicationRepository, ApplicationStatus};
use crate::identity::{PrincipalId, PrincipalRecord, PrincipalRepository};
use crate::jobs::{Job, JobId, JobRepository};

use super::RepositoryError;

#[derive(Default)]
struct Tables {
    principals: HashMap<PrincipalId, PrincipalRecord>,
    emails: HashMap<String, PrincipalId>,
    jobs: HashMap<JobId, Job>,
    applications: HashMap<ApplicationId, Application>,
    submissions: HashMap<(JobId, PrincipalId), ApplicationId>,
}

/// Process-local store. One lock guards every table, so each repository call is a
/// serializable unit and cross-table writes (cascade delete) are invisible until done.
#[derive(Default, Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, RepositoryError> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, RepositoryError> {
        self.tables
            .write()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

impl Tables {
    fn application_count(&self, job_id: &JobId) -> usize {
        self.applications
            .values()
            .filter(|application| &application.job_id == job_id)
            .count()
    }

    fn application_counts(&self) -> HashMap<&JobId, usize> {
        let mut counts = HashMap::new();
        for application in self.applications.values() {
            *counts.entry(&application.job_id).or_insert(0) += 1;
        }
        counts
    }
}

fn newest_job_first(a: &Job, b: &Job) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

fn newest_applications_first(applications: &mut [Application]) {
    applications.sort_by(|a, b| {
        b.applied_at
            .cmp(&a.applied_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

impl PrincipalRepository for MemoryStore {
    fn insert_principal(&self, record: PrincipalRecord) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        let email = record.principal.email.clone();
        let id = record.principal.id.clone();
        if tables.emails.contains_key(&email) || tables.principals.contains_key(&id) {
            return Err(RepositoryError::Conflict);
        }
        tables.emails.insert(email, id.clone());
        tables.principals.insert(id, record);
        Ok(())
    }

    fn fetch_principal(&self, id: &PrincipalId) -> Result<Option<PrincipalRecord>, RepositoryError> {
        Ok(self.read()?.principals.get(id).cloned())
    }

    fn fetch_principal_by_email(
        &self,
        email: &str,
    ) -> Result<Option<PrincipalRecord>, RepositoryError> {
        let tables = self.read()?;
        Ok(tables
            .emails
            .get(email)
            .and_then(|id| tables.principals.get(id))
            .cloned())
    }
}

impl JobRepository for MemoryStore {
    fn insert_job(&self, job: Job) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        if tables.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.read()?.jobs.get(id).cloned())
    }

    fn update_job<F, E>(&self, id: &JobId, apply: F) -> Result<Job, E>
    where
        F: FnOnce(&mut Job) -> Result<(), E>,
        E: From<RepositoryError>,
    {
        let mut tables = self.write()?;
        let stored = tables.jobs.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let mut scratch = stored.clone();
        apply(&mut scratch)?;
        *stored = scratch.clone();
        Ok(scratch)
    }

    fn delete_job(&self, id: &JobId) -> Result<usize, RepositoryError> {
        let mut tables = self.write()?;
        if tables.jobs.remove(id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        let before = tables.applications.len();
        tables.applications.retain(|_, application| &application.job_id != id);
        tables.submissions.retain(|(job_id, _), _| job_id != id);
        Ok(before - tables.applications.len())
    }

    fn fetch_job_with_count(&self, id: &JobId) -> Result<Option<(Job, usize)>, RepositoryError> {
        let tables = self.read()?;
        Ok(tables
            .jobs
            .get(id)
            .map(|job| (job.clone(), tables.application_count(id))))
    }

    fn list_jobs_with_counts(
        &self,
        owner: Option<&PrincipalId>,
    ) -> Result<Vec<(Job, usize)>, RepositoryError> {
        let tables = self.read()?;
        let counts = tables.application_counts();
        let mut jobs: Vec<(Job, usize)> = tables
            .jobs
            .values()
            .filter(|job| owner.map_or(true, |owner| &job.owner_id == owner))
            .map(|job| (job.clone(), counts.get(&job.id).copied().unwrap_or(0)))
            .collect();
        jobs.sort_by(|(a, _), (b, _)| newest_job_first(a, b));
        Ok(jobs)
    }
}

impl ApplicationRepository for MemoryStore {
    fn insert_application(&self, application: Application) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        if !tables.jobs.contains_key(&application.job_id) {
            return Err(RepositoryError::MissingParent);
        }
        let key = (application.job_id.clone(), application.applicant_id.clone());
        if tables.submissions.contains_key(&key)
            || tables.applications.contains_key(&application.id)
        {
            return Err(RepositoryError::Conflict);
        }
        tables.submissions.insert(key, application.id.clone());
        tables
            .applications
            .insert(application.id.clone(), application);
        Ok(())
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(self.read()?.applications.get(id).cloned())
    }

    fn transition_application(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.write()?;
        let application = tables
            .applications
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        if application.status != expected {
            return Err(RepositoryError::StaleStatus {
                expected,
                current: application.status,
            });
        }
        application.status = next;
        Ok(application.clone())
    }

    fn has_applied(
        &self,
        job_id: &JobId,
        applicant: &PrincipalId,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .read()?
            .submissions
            .contains_key(&(job_id.clone(), applicant.clone())))
    }

    fn applications_by_applicant(
        &self,
        applicant: &PrincipalId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let mut applications: Vec<Application> = self
            .read()?
            .applications
            .values()
            .filter(|application| &application.applicant_id == applicant)
            .cloned()
            .collect();
        newest_applications_first(&mut applications);
        Ok(applications)
    }

    fn applications_for_job(&self, job_id: &JobId) -> Result<Vec<Application>, RepositoryError> {
        let tables = self.read()?;
        if !tables.jobs.contains_key(job_id) {
            return Err(RepositoryError::NotFound);
        }
        let mut applications: Vec<Application> = tables
            .applications
            .values()
            .filter(|application| &application.job_id == job_id)
            .cloned()
            .collect();
        newest_applications_first(&mut applications);
        Ok(applications)
    }

    fn count_applications_for_job(&self, job_id: &JobId) -> Result<usize, RepositoryError> {
        Ok(self.read()?.application_count(job_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{ContactDetails, PasswordHash, Principal, RoleProfile};
    use crate::jobs::JobType;
    use chrono::{Duration, NaiveDate, Utc};
    use std::thread;

    fn job(id: &str, owner: &str) -> Job {
        Job {
            id: JobId(id.to_string()),
            owner_id: PrincipalId(owner.to_string()),
            company_name: "Corp".to_string(),
            title: "Engineer".to_string(),
            description: "Ship it".to_string(),
            requirements: "Rust".to_string(),
            location: "Remote".to_string(),
            job_type: JobType::FullTime,
            salary_min: 10,
            salary_max: 20,
            deadline: NaiveDate::from_ymd_opt(2026, 6, 30).expect("valid date"),
            created_at: Utc::now(),
        }
    }

    fn application(id: &str, job_id: &str, applicant: &str) -> Application {
        Application {
            id: ApplicationId(id.to_string()),
            job_id: JobId(job_id.to_string()),
            applicant_id: PrincipalId(applicant.to_string()),
            resume_url: "http://x".to_string(),
            cover_letter: None,
            status: ApplicationStatus::Pending,
            applied_at: Utc::now(),
        }
    }

    #[test]
    fn duplicate_email_conflicts() {
        let store = MemoryStore::default();
        let record = |id: &str| PrincipalRecord {
            principal: Principal {
                id: PrincipalId(id.to_string()),
                name: "Sam".to_string(),
                email: "sam@example.com".to_string(),
                profile: RoleProfile::Applicant,
                contact: ContactDetails::default(),
                created_at: Utc::now(),
            },
            password: PasswordHash::new("password-1", 1_000),
        };

        store.insert_principal(record("p1")).expect("first insert");
        assert!(matches!(
            store.insert_principal(record("p2")),
            Err(RepositoryError::Conflict)
        ));
        let found = store
            .fetch_principal_by_email("sam@example.com")
            .expect("read")
            .expect("present");
        assert_eq!(found.principal.id, PrincipalId("p1".to_string()));
    }

    #[test]
    fn application_insert_requires_parent_and_unique_pair() {
        let store = MemoryStore::default();
        assert!(matches!(
            store.insert_application(application("a1", "j1", "p1")),
            Err(RepositoryError::MissingParent)
        ));

        store.insert_job(job("j1", "e1")).expect("job stored");
        store
            .insert_application(application("a1", "j1", "p1"))
            .expect("first application");
        assert!(matches!(
            store.insert_application(application("a2", "j1", "p1")),
            Err(RepositoryError::Conflict)
        ));
        store
            .insert_application(application("a3", "j1", "p2"))
            .expect("different applicant");
        assert_eq!(store.count_applications_for_job(&JobId("j1".to_string())).expect("count"), 2);
    }

    #[test]
    fn concurrent_submissions_for_same_pair_admit_exactly_one() {
        let store = MemoryStore::default();
        store.insert_job(job("j1", "e1")).expect("job stored");

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let store = store.clone();
                thread::spawn(move || {
                    store.insert_application(application(&format!("a{n}"), "j1", "p1"))
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .filter(Result::is_ok)
            .count();
        assert_eq!(successes, 1);
    }

    #[test]
    fn transition_is_conditional_on_expected_status() {
        let store = MemoryStore::default();
        store.insert_job(job("j1", "e1")).expect("job stored");
        store
            .insert_application(application("a1", "j1", "p1"))
            .expect("stored");
        let id = ApplicationId("a1".to_string());

        let accepted = store
            .transition_application(&id, ApplicationStatus::Pending, ApplicationStatus::Accepted)
            .expect("pending -> accepted");
        assert_eq!(accepted.status, ApplicationStatus::Accepted);

        match store.transition_application(
            &id,
            ApplicationStatus::Pending,
            ApplicationStatus::Rejected,
        ) {
            Err(RepositoryError::StaleStatus { current, .. }) => {
                assert_eq!(current, ApplicationStatus::Accepted)
            }
            other => panic!("expected stale status, got {other:?}"),
        }
    }

    #[test]
    fn delete_cascades_to_applications() {
        let store = MemoryStore::default();
        store.insert_job(job("j1", "e1")).expect("job stored");
        store.insert_job(job("j2", "e1")).expect("job stored");
        store
            .insert_application(application("a1", "j1", "p1"))
            .expect("stored");
        store
            .insert_application(application("a2", "j1", "p2"))
            .expect("stored");
        store
            .insert_application(application("a3", "j2", "p1"))
            .expect("stored");

        let removed = store.delete_job(&JobId("j1".to_string())).expect("deleted");
        assert_eq!(removed, 2);
        assert!(store
            .fetch_application(&ApplicationId("a1".to_string()))
            .expect("read")
            .is_none());
        assert!(matches!(
            store.applications_for_job(&JobId("j1".to_string())),
            Err(RepositoryError::NotFound)
        ));
        assert!(!store
            .has_applied(&JobId("j1".to_string()), &PrincipalId("p1".to_string()))
            .expect("read"));
        assert_eq!(
            store
                .applications_by_applicant(&PrincipalId("p1".to_string()))
                .expect("read")
                .len(),
            1
        );
    }

    #[test]
    fn failed_update_leaves_record_untouched() {
        let store = MemoryStore::default();
        store.insert_job(job("j1", "e1")).expect("job stored");
        let id = JobId("j1".to_string());

        let result: Result<Job, RepositoryError> = store.update_job(&id, |job| {
            job.title = "Changed".to_string();
            Err(RepositoryError::Unavailable("rejected".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(
            store.fetch_job(&id).expect("read").expect("present").title,
            "Engineer"
        );
    }

    #[test]
    fn listing_is_newest_first() {
        let store = MemoryStore::default();
        let mut older = job("j-old", "e1");
        older.created_at = Utc::now() - Duration::days(2);
        store.insert_job(older).expect("stored");
        store.insert_job(job("j-new", "e1")).expect("stored");
        store.insert_job(job("j-other", "e2")).expect("stored");

        let owner = PrincipalId("e1".to_string());
        let ids: Vec<_> = store
            .list_jobs_with_counts(Some(&owner))
            .expect("read")
            .into_iter()
            .map(|(job, _)| job.id.0)
            .collect();
        assert_eq!(ids, vec!["j-new".to_string(), "j-old".to_string()]);
        assert_eq!(store.list_jobs_with_counts(None).expect("read").len(), 3);
    }

    #[test]
    fn counts_travel_with_their_jobs() {
        let store = MemoryStore::default();
        store.insert_job(job("j1", "e1")).expect("job stored");
        store.insert_job(job("j2", "e1")).expect("job stored");
        for (id, applicant) in [("a1", "p1"), ("a2", "p2")] {
            store
                .insert_application(application(id, "j1", applicant))
                .expect("stored");
        }

        let (fetched, count) = store
            .fetch_job_with_count(&JobId("j1".to_string()))
            .expect("read")
            .expect("present");
        assert_eq!((fetched.id.0.as_str(), count), ("j1", 2));

        let counts: HashMap<String, usize> = store
            .list_jobs_with_counts(None)
            .expect("read")
            .into_iter()
            .map(|(job, count)| (job.id.0, count))
            .collect();
        assert_eq!(counts.get("j1"), Some(&2));
        assert_eq!(counts.get("j2"), Some(&0));

        store.delete_job(&JobId("j1".to_string())).expect("deleted");
        assert!(store
            .fetch_job_with_count(&JobId("j1".to_string()))
            .expect("read")
            .is_none());
    }

    #[test]
    fn counted_reads_never_observe_a_half_deleted_job() {
        for round in 0..200 {
            let store = MemoryStore::default();
            let job_id = JobId(format!("j{round}"));
            store.insert_job(job(&job_id.0, "e1")).expect("job stored");
            store
                .insert_application(application("a1", &job_id.0, "p1"))
                .expect("stored");

            let deleter = {
                let store = store.clone();
                let job_id = job_id.clone();
                thread::spawn(move || store.delete_job(&job_id))
            };
            for _ in 0..20 {
                if let Some((_, count)) = store.fetch_job_with_count(&job_id).expect("read") {
                    assert_eq!(count, 1);
                }
                for (_, count) in store.list_jobs_with_counts(None).expect("read") {
                    assert_eq!(count, 1);
                }
            }
            deleter.join().expect("thread completes").expect("deleted");
        }
    }
}
