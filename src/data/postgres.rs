//! Postgres-backed `EnrollmentRepository`, using runtime-checked queries
//! (`sqlx::query`/`sqlx::query_as`) rather than the compile-time `query!`
//! macros, since those require a reachable database at build time.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::models::{Course, Enrollment, RegistrationConfig, Student, REGISTRATION_CONFIG_ID};
use crate::domain::persistence::EnrollmentRepository;

pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentRepository for PgRepository {
    async fn insert_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
        position: i32,
        is_waitlist: bool,
    ) -> anyhow::Result<Enrollment> {
        let row = sqlx::query_as::<_, Enrollment>(
            "INSERT INTO enrollments (student_id, course_id, position, is_waitlist, created_at) \
             VALUES ($1, $2, $3, $4, now()) \
             RETURNING id, student_id, course_id, position, is_waitlist, created_at",
        )
        .bind(student_id)
        .bind(course_id)
        .bind(position)
        .bind(is_waitlist)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn fetch_all_enrollments(&self) -> anyhow::Result<Vec<Enrollment>> {
        let rows = sqlx::query_as::<_, Enrollment>(
            "SELECT id, student_id, course_id, position, is_waitlist, created_at FROM enrollments",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn fetch_all_students(&self) -> anyhow::Result<Vec<Student>> {
        let rows = sqlx::query_as::<_, Student>("SELECT id, name, phone, birth_date FROM students")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn fetch_all_courses(&self) -> anyhow::Result<Vec<Course>> {
        let rows = sqlx::query_as::<_, Course>(
            "SELECT id, name, instructor, description, schedules, capacity, is_special FROM courses",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_students(&self, students: &[Student]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for student in students {
            sqlx::query(
                "INSERT INTO students (name, phone, birth_date) VALUES ($1, $2, $3) \
                 ON CONFLICT (phone) DO NOTHING",
            )
            .bind(&student.name)
            .bind(&student.phone)
            .bind(&student.birth_date)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_all_students(&self) -> anyhow::Result<()> {
        sqlx::query("TRUNCATE TABLE students RESTART IDENTITY CASCADE")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_course(&self, course: &Course) -> anyhow::Result<Course> {
        let row = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (name, instructor, description, schedules, capacity, is_special) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, name, instructor, description, schedules, capacity, is_special",
        )
        .bind(&course.name)
        .bind(&course.instructor)
        .bind(&course.description)
        .bind(&course.schedules)
        .bind(course.capacity)
        .bind(course.is_special)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_course(&self, course_id: i64) -> anyhow::Result<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            anyhow::bail!("course not found");
        }
        Ok(())
    }

    async fn insert_courses(&self, courses: &[Course]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for course in courses {
            sqlx::query(
                "INSERT INTO courses (name, instructor, description, schedules, capacity, is_special) \
                 VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (name) DO NOTHING",
            )
            .bind(&course.name)
            .bind(&course.instructor)
            .bind(&course.description)
            .bind(&course.schedules)
            .bind(course.capacity)
            .bind(course.is_special)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_all_courses(&self) -> anyhow::Result<()> {
        sqlx::query("TRUNCATE TABLE courses RESTART IDENTITY CASCADE")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all_enrollments(&self) -> anyhow::Result<()> {
        sqlx::query("TRUNCATE TABLE enrollments RESTART IDENTITY CASCADE")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_config(&self) -> anyhow::Result<Option<RegistrationConfig>> {
        let row = sqlx::query_as::<_, RegistrationConfig>(
            "SELECT id, enabled, start_time, end_time FROM registration_configs WHERE id = $1",
        )
        .bind(REGISTRATION_CONFIG_ID)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_config(&self) -> anyhow::Result<RegistrationConfig> {
        let row = sqlx::query_as::<_, RegistrationConfig>(
            "INSERT INTO registration_configs (id, enabled, start_time, end_time) \
             VALUES ($1, false, '', '') \
             ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id \
             RETURNING id, enabled, start_time, end_time",
        )
        .bind(REGISTRATION_CONFIG_ID)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_enabled(&self, enabled: bool) -> anyhow::Result<()> {
        sqlx::query("UPDATE registration_configs SET enabled = $1 WHERE id = $2")
            .bind(enabled)
            .bind(REGISTRATION_CONFIG_ID)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_period(&self, start_time: &str, end_time: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE registration_configs SET start_time = $1, end_time = $2 WHERE id = $3")
            .bind(start_time)
            .bind(end_time)
            .bind(REGISTRATION_CONFIG_ID)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // `#[sqlx::test]` applies the migrations in ./migrations to a fresh
    // throwaway database before handing back the pool.
    #[sqlx::test]
    async fn create_course_round_trips_through_postgres(pool: PgPool) {
        let repo = PgRepository::new(pool);
        let course = Course {
            id: 0,
            name: "CS101".to_owned(),
            instructor: "Dr. Kim".to_owned(),
            description: "intro".to_owned(),
            schedules: "월 09:00~10:00".to_owned(),
            capacity: 30,
            is_special: false,
        };
        let created = repo.create_course(&course).await.unwrap();
        assert!(created.id > 0);

        let all = repo.fetch_all_courses().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "CS101");
    }

    #[sqlx::test]
    async fn delete_course_errors_when_not_found(pool: PgPool) {
        let repo = PgRepository::new(pool);
        let result = repo.delete_course(42).await;
        assert!(result.is_err());
    }
}
