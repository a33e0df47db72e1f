use sjcl_crypto::{decrypt, derive_key, encrypt, EncryptOptions, KeySize, Mode, Passphrase};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

fn bench_encrypt(bencher: divan::Bencher, mode: Mode, size: usize) {
    let passphrase = Passphrase::from("bench-passphrase");
    // One PBKDF2 round so the AEAD dominates
    let options = EncryptOptions::new(mode).with_iterations(1);
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            encrypt(
                divan::black_box(&data),
                divan::black_box(&passphrase),
                &options,
            )
            .unwrap()
        });
}

fn bench_decrypt(bencher: divan::Bencher, mode: Mode, size: usize) {
    let passphrase = Passphrase::from("bench-passphrase");
    let options = EncryptOptions::new(mode).with_iterations(1);
    let envelope = encrypt(&make_data(size), &passphrase, &options).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| decrypt(divan::black_box(&envelope), divan::black_box(&passphrase)).unwrap());
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt_ccm(bencher: divan::Bencher, size: usize) {
    bench_encrypt(bencher, Mode::Ccm, size);
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt_gcm(bencher: divan::Bencher, size: usize) {
    bench_encrypt(bencher, Mode::Gcm, size);
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt_ccm(bencher: divan::Bencher, size: usize) {
    bench_decrypt(bencher, Mode::Ccm, size);
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt_gcm(bencher: divan::Bencher, size: usize) {
    bench_decrypt(bencher, Mode::Gcm, size);
}

#[divan::bench(args = [1000, 10000])]
fn bench_derive_key(bencher: divan::Bencher, iterations: u32) {
    let passphrase = Passphrase::from("bench-passphrase");
    bencher.bench(|| {
        derive_key(
            divan::black_box(&passphrase),
            &[0x5Au8; 8],
            iterations,
            KeySize::Aes128,
        )
        .unwrap()
    });
}

fn main() {
    divan::main();
}
