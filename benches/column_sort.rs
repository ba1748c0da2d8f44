use criterion::{black_box, criterion_group, criterion_main, Criterion};
use salve_viewer::data::records::{PatientField, PatientRecord};
use salve_viewer::view::controller::{sort_rows, SortDirection};

fn create_patients(count: usize) -> Vec<PatientRecord> {
    let first_names = ["Linnell", "Hillary", "Barron", "Emelda", "Danika", "Gustav"];
    let last_names = ["Rentilll", "Raynes", "Rabbitt", "Oller", "Blazevic", "Lerego"];

    (0..count)
        .map(|i| {
            PatientRecord::new(
                i.to_string(),
                (i % 2 + 1).to_string(),
                first_names[i % first_names.len()],
                last_names[(i * 7) % last_names.len()],
                format!("19{:02}-{:02}-{:02}", 50 + i % 50, 1 + i % 12, 1 + i % 28),
            )
        })
        .collect()
}

fn benchmark_column_sort(c: &mut Criterion) {
    let patients = create_patients(10_000);

    for field in [PatientField::Id, PatientField::LastName, PatientField::DateOfBirth] {
        c.bench_function(&format!("sort_10k_by_{}", field), |b| {
            b.iter(|| {
                let mut rows: Vec<usize> = (0..patients.len()).collect();
                sort_rows(
                    &mut rows,
                    black_box(&patients),
                    field,
                    SortDirection::Descending,
                );
                rows
            })
        });
    }
}

criterion_group!(benches, benchmark_column_sort);
criterion_main!(benches);
